use anyhow::Result;
use candle_nn::VarMap;
use tempdir::TempDir;
use vrl_candle_agent::{
    dqn::{Dqn, DqnConfig},
    mlp::{Mlp, MlpConfig},
    opt::OptimizerConfig,
    QNetworkConfig,
};
use vrl_core::{
    dummy::{TwoStateEnv, TwoStateEnvConfig},
    record::Record,
    util::train,
    ActionValues, Agent, Configurable, Env, EpsilonGreedyConfig, Obs, Transition,
};

fn config(batch_size: usize, target_update_freq: usize) -> DqnConfig<MlpConfig> {
    DqnConfig::default()
        .model_config(
            QNetworkConfig::default()
                .q_config(MlpConfig::new(2, vec![16, 16], 2, false))
                .opt_config(OptimizerConfig::Adam { lr: 0.01 }),
        )
        .gamma(0.9)
        .batch_size(batch_size)
        .replay_buffer_size(100)
        .target_update_freq(target_update_freq)
        .explorer(EpsilonGreedyConfig::default().epsilon(0.2).seed(5))
}

/// Values of all variables, sorted by name.
fn params(varmap: &VarMap) -> Result<Vec<(String, Vec<f32>)>> {
    let data = varmap.data().lock().unwrap();
    let mut params = data
        .iter()
        .map(|(name, var)| -> Result<(String, Vec<f32>)> {
            Ok((name.clone(), var.as_tensor().flatten_all()?.to_vec1::<f32>()?))
        })
        .collect::<Result<Vec<_>>>()?;
    params.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(params)
}

fn tr(s: usize, a: usize) -> Transition {
    let (reward, next) = if a == s { (1.0, 1 - s) } else { (0.0, s) };
    Transition::new(Obs::Discrete(s), a, reward, Obs::Discrete(next), false)
}

#[test]
fn test_target_starts_as_exact_copy() -> Result<()> {
    let agent = Dqn::<Mlp>::build(config(2, 3))?;
    assert_eq!(
        params(agent.qnet().get_varmap())?,
        params(agent.qnet_tgt().get_varmap())?
    );
    Ok(())
}

#[test]
fn test_no_training_before_batch_is_available() -> Result<()> {
    let mut agent = Dqn::<Mlp>::build(config(4, 3))?;
    let before = params(agent.qnet().get_varmap())?;

    for i in 0..3 {
        let record = agent.update(&tr(i % 2, 0), &Record::empty())?;
        assert!(record.is_empty());
    }

    assert_eq!(agent.buffer().len(), 3);
    assert_eq!(agent.n_train_steps(), 0);
    assert_eq!(params(agent.qnet().get_varmap())?, before);
    Ok(())
}

#[test]
fn test_target_sync_is_bit_identical() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut agent = Dqn::<Mlp>::build(config(2, 3))?;

    agent.update(&tr(0, 0), &Record::empty())?;
    agent.update(&tr(1, 0), &Record::empty())?;
    agent.update(&tr(1, 1), &Record::empty())?;
    assert_eq!(agent.n_train_steps(), 2);
    assert_ne!(
        params(agent.qnet().get_varmap())?,
        params(agent.qnet_tgt().get_varmap())?
    );

    let record = agent.update(&tr(0, 1), &Record::empty())?;
    assert_eq!(record.get_scalar("n_train_steps")?, 3.0);
    assert!(record.get_scalar("loss")?.is_finite());
    assert_eq!(
        params(agent.qnet().get_varmap())?,
        params(agent.qnet_tgt().get_varmap())?
    );
    Ok(())
}

#[test]
fn test_malformed_observation_is_rejected() -> Result<()> {
    let mut agent = Dqn::<Mlp>::build(config(2, 3))?;
    let tr = Transition::new(
        Obs::Continuous(vec![0.0, 1.0, 2.0]),
        0,
        0.0,
        Obs::Continuous(vec![0.0, 1.0]),
        false,
    );
    assert!(agent.update(&tr, &Record::empty()).is_err());
    assert!(agent.buffer().is_empty());
    Ok(())
}

#[test]
fn test_learning_on_two_state_env() -> Result<()> {
    let mut env = TwoStateEnv::build(&TwoStateEnvConfig, 0)?;
    let mut agent = Dqn::<Mlp>::build(config(8, 20))?;

    train(&mut env, &mut agent, 20, 25)?;

    assert!(agent.n_train_steps() > 0);
    assert_eq!(agent.stats().total_steps, 500);
    for s in 0..2 {
        let values = agent.qnet().action_values(&Obs::Discrete(s))?;
        assert_eq!(values.len(), 2);
        assert!(values.iter().all(|v| v.is_finite()));
    }
    Ok(())
}

#[test]
fn test_config_yaml() -> Result<()> {
    let config = config(8, 20);
    let dir = TempDir::new("dqn_config")?;
    let path = dir.path().join("dqn.yaml");
    config.save(&path)?;
    assert_eq!(DqnConfig::<MlpConfig>::load(&path)?, config);

    let agent = Dqn::<Mlp>::build_from_path(&path)?;
    assert_eq!(agent.buffer().capacity(), 100);
    Ok(())
}
