use anyhow::Result;
use vrl_core::{
    dummy::{TwoStateEnv, TwoStateEnvConfig},
    util::train,
    Agent, Configurable, Env, EpsilonGreedyConfig,
};
use vrl_ndarray_agent::tabular::{QLearning, Sarsa, TabularConfig};

fn config() -> TabularConfig {
    TabularConfig::default()
        .n_states(2)
        .n_actions(2)
        .alpha(0.5)
        .gamma(0.9)
        .explorer(
            EpsilonGreedyConfig::default()
                .epsilon(0.3)
                .epsilon_decay(1.0)
                .seed(7),
        )
}

#[test]
fn test_q_learning_converges_on_two_state_env() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut env = TwoStateEnv::build(&TwoStateEnvConfig, 0)?;
    let mut agent = QLearning::build(config())?;

    train(&mut env, &mut agent, 200, 50)?;

    let q = agent.q();
    assert_eq!(q.dim(), (2, 2));
    for s in 0..2 {
        assert!((q[[s, s]] - 10.0).abs() < 0.1, "Q = {:?}", q);
        assert!(q[[s, 1 - s]] < q[[s, s]]);
    }
    assert_eq!(agent.stats().total_steps, 200 * 50);
    assert_eq!(agent.stats().episodes, 200);
    Ok(())
}

#[test]
fn test_sarsa_prefers_rewarding_action() -> Result<()> {
    let mut env = TwoStateEnv::build(&TwoStateEnvConfig, 0)?;
    let mut agent = Sarsa::build(config())?;

    train(&mut env, &mut agent, 200, 50)?;

    let q = agent.q();
    assert_eq!(q.dim(), (2, 2));
    assert!(q.iter().all(|v| v.is_finite()));
    for s in 0..2 {
        assert!(q[[s, s]] > q[[s, 1 - s]], "Q = {:?}", q);
    }
    Ok(())
}
