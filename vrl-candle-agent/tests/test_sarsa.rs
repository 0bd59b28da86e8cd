use anyhow::Result;
use vrl_candle_agent::{
    mlp::{Mlp, MlpConfig},
    opt::OptimizerConfig,
    sarsa::{NeuralSarsa, NeuralSarsaConfig},
    QNetworkConfig,
};
use vrl_core::{
    dummy::{LineWalkEnv, LineWalkEnvConfig},
    util::train,
    ActionValues, Agent, Configurable, Env, EpsilonGreedyConfig, Obs,
};

#[test]
fn test_neural_sarsa_on_line_walk() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut env = LineWalkEnv::build(&LineWalkEnvConfig { n_cells: 5 }, 0)?;
    let config = NeuralSarsaConfig::default()
        .model_config(
            QNetworkConfig::default()
                .q_config(MlpConfig::new(1, vec![16], 2, false))
                .opt_config(OptimizerConfig::AdamW {
                    lr: 0.01,
                    weight_decay: 0.001,
                }),
        )
        .gamma(0.9)
        .explorer(EpsilonGreedyConfig::default().epsilon(0.3).seed(11));
    let mut agent = NeuralSarsa::<Mlp>::build(config)?;

    let obs = Obs::Continuous(vec![0.4]);
    let before = agent.qnet().action_values(&obs)?;
    let rewards = train(&mut env, &mut agent, 10, 50)?;

    assert_eq!(rewards.len(), 10);
    assert_eq!(agent.stats().episodes, 10);
    let values = agent.qnet().action_values(&obs)?;
    assert!(values.iter().all(|v| v.is_finite()));
    assert_ne!(values, before);
    assert!(agent.get_action(&Obs::Discrete(1)).is_err());
    Ok(())
}
