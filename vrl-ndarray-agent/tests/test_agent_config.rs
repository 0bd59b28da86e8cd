use anyhow::Result;
use tempdir::TempDir;
use vrl_core::{
    dummy::{LineWalkEnv, LineWalkEnvConfig},
    error::VrlError,
    util::{run_episode, train},
    Agent, Configurable, Env, EpsilonGreedyConfig, Obs,
};
use vrl_ndarray_agent::{
    linear::{FeatureConfig, LinearConfig, SemiGradientSarsa, TileCoderConfig},
    tabular::TabularConfig,
    NdarrayAgent, NdarrayAgentConfig,
};

#[test]
fn test_build_from_yaml() -> Result<()> {
    let yaml = "algorithm: QLearning\nn_states: 4\nn_actions: 3\nalpha: 0.2\n";
    let config: NdarrayAgentConfig = serde_yaml::from_str(yaml)?;
    assert_eq!(
        config,
        NdarrayAgentConfig::QLearning(TabularConfig::default().n_states(4).n_actions(3).alpha(0.2))
    );

    let dir = TempDir::new("ndarray_agent")?;
    let path = dir.path().join("agent.yaml");
    config.save(&path)?;
    assert_eq!(NdarrayAgentConfig::load(&path)?, config);

    let mut agent = NdarrayAgent::build_from_path(&path)?;
    assert_eq!(agent.algorithm(), "QLearning");
    assert!(agent.get_action(&Obs::Discrete(3))? < 3);

    let err = agent
        .get_action(&Obs::Continuous(vec![0.0]))
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<VrlError>(),
        Some(VrlError::InvalidStateType { .. })
    ));
    Ok(())
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = NdarrayAgentConfig::Sarsa(TabularConfig::default().n_states(2).n_actions(2).alpha(0.0));
    let err = NdarrayAgent::build(config).err().unwrap();
    assert!(matches!(
        err.downcast_ref::<VrlError>(),
        Some(VrlError::InvalidConfig(_))
    ));
}

#[test]
fn test_linear_sarsa_on_line_walk() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut env = LineWalkEnv::build(&LineWalkEnvConfig::default(), 0)?;
    let features = FeatureConfig::TileCoding(
        TileCoderConfig::default()
            .space(&env.observation_space())?
            .num_tilings(4)
            .num_tiles(4),
    );
    let config = NdarrayAgentConfig::SemiGradientSarsa(
        LinearConfig::default()
            .features(features)
            .n_actions(2)
            .alpha(0.1)
            .gamma(1.0)
            .explorer(EpsilonGreedyConfig::default().epsilon(0.1).seed(1)),
    );
    let mut agent = NdarrayAgent::build(config)?;

    let rewards = train(&mut env, &mut agent, 100, 200)?;
    assert_eq!(rewards.len(), 100);

    // Once learned, moving right takes close to the minimum of 10 steps.
    let last = run_episode(&mut env, &mut agent, 200)?;
    assert!(last >= -50.0, "last episode reward = {}", last);
    Ok(())
}

#[test]
fn test_raw_features_on_line_walk() -> Result<()> {
    let mut env = LineWalkEnv::build(&LineWalkEnvConfig::default(), 0)?;
    let dim = env.observation_space().dim().unwrap();
    let config = LinearConfig::default()
        .features(FeatureConfig::Raw { dim })
        .n_actions(2)
        .alpha(0.05)
        .gamma(0.9)
        .explorer(EpsilonGreedyConfig::default().epsilon(0.2).seed(3));
    let mut agent = SemiGradientSarsa::build(config)?;

    let rewards = train(&mut env, &mut agent, 30, 100)?;
    assert_eq!(rewards.len(), 30);
    assert_eq!(agent.weights().dim(), (1, 2));
    assert!(agent.weights().iter().all(|w| w.is_finite()));
    assert_eq!(
        agent.stats().total_steps,
        rewards.iter().map(|r| (-r) as usize).sum::<usize>()
    );
    Ok(())
}
