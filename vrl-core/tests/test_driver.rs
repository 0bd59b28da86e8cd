use anyhow::Result;
use vrl_core::{
    dummy::{LineWalkEnv, LineWalkEnvConfig, TwoStateEnv, TwoStateEnvConfig},
    record::Record,
    util::{run_episode, train},
    Agent, AgentStats, Env, EpisodeStats, Obs, Transition,
};

/// Always moves with a fixed action and remembers what it saw.
struct Recorder {
    act: usize,
    transitions: Vec<Transition>,
    stats: EpisodeStats,
    decays: usize,
}

impl Recorder {
    fn new(act: usize) -> Self {
        Self {
            act,
            transitions: vec![],
            stats: EpisodeStats::default(),
            decays: 0,
        }
    }
}

impl Agent for Recorder {
    fn get_action(&mut self, _obs: &Obs) -> Result<usize> {
        Ok(self.act)
    }

    fn update(&mut self, tr: &Transition, _info: &Record) -> Result<Record> {
        self.stats.record_step();
        self.transitions.push(tr.clone());
        Ok(Record::empty())
    }

    fn start_episode(&mut self) {
        self.stats.start_episode();
    }

    fn end_episode(&mut self, total_reward: f32) -> Result<()> {
        self.stats.end_episode(total_reward);
        Ok(())
    }

    fn stats(&self) -> AgentStats {
        self.stats.stats()
    }

    fn decay_exploration(&mut self) {
        self.decays += 1;
    }
}

#[test]
fn test_truncated_episode_is_not_terminal() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut env = TwoStateEnv::build(&TwoStateEnvConfig, 0)?;
    let mut agent = Recorder::new(0);

    let total = run_episode(&mut env, &mut agent, 5)?;

    // Action 0 pays in state 0 only, so rewards alternate 1, 0, 0, ...
    assert_eq!(total, 1.0);
    assert_eq!(agent.transitions.len(), 5);
    assert!(agent.transitions.iter().all(|tr| !tr.is_done));
    assert_eq!(agent.transitions[0].next_obs, Obs::Discrete(1));
    assert_eq!(agent.transitions[1].obs, Obs::Discrete(1));
    Ok(())
}

#[test]
fn test_line_walk_terminates() -> Result<()> {
    let mut env = LineWalkEnv::build(&LineWalkEnvConfig { n_cells: 4 }, 0)?;
    let mut agent = Recorder::new(1);

    let rewards = train(&mut env, &mut agent, 3, 100)?;

    assert_eq!(rewards, vec![-4.0, -4.0, -4.0]);
    let stats = agent.stats();
    assert_eq!(stats.episodes, 3);
    assert_eq!(stats.total_steps, 12);
    assert_eq!(stats.mean_reward, -4.0);
    assert_eq!(agent.decays, 3);

    let last = agent.transitions.last().unwrap();
    assert!(last.is_done);
    assert_eq!(last.next_obs, Obs::Continuous(vec![1.0]));
    Ok(())
}
