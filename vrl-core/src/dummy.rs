//! Small environments used in tests.
use crate::{record::Record, Env, Obs, Space, Step};
use anyhow::Result;

/// Configuration of [`TwoStateEnv`].
#[derive(Clone, Debug, Default)]
pub struct TwoStateEnvConfig;

/// Two states and two actions.
///
/// Taking action `s` in state `s` yields reward 1 and moves to the other
/// state; the other action yields 0 and stays. Never terminates.
pub struct TwoStateEnv {
    state: usize,
}

impl Env for TwoStateEnv {
    type Config = TwoStateEnvConfig;

    fn build(_config: &Self::Config, _seed: i64) -> Result<Self> {
        Ok(Self { state: 0 })
    }

    fn reset(&mut self) -> Result<Obs> {
        self.state = 0;
        Ok(Obs::Discrete(self.state))
    }

    fn step(&mut self, act: usize) -> Result<(Step, Record)> {
        let reward = if act == self.state {
            self.state = 1 - self.state;
            1.0
        } else {
            0.0
        };
        let step = Step::new(Obs::Discrete(self.state), reward, false, false);
        Ok((step, Record::empty()))
    }

    fn action_space(&self) -> Space {
        Space::Discrete(2)
    }

    fn observation_space(&self) -> Space {
        Space::Discrete(2)
    }
}

/// Configuration of [`LineWalkEnv`].
#[derive(Clone, Debug)]
pub struct LineWalkEnvConfig {
    /// Number of steps from the left edge to the right edge.
    pub n_cells: usize,
}

impl Default for LineWalkEnvConfig {
    fn default() -> Self {
        Self { n_cells: 10 }
    }
}

/// A walk on `[0, 1]` observed as a 1-D continuous position.
///
/// Action 0 moves left, action 1 moves right, by `1 / n_cells`. Every step
/// costs -1; reaching the right edge terminates the episode.
pub struct LineWalkEnv {
    n_cells: usize,
    cell: usize,
}

impl LineWalkEnv {
    fn obs(&self) -> Obs {
        Obs::Continuous(vec![self.cell as f32 / self.n_cells as f32])
    }
}

impl Env for LineWalkEnv {
    type Config = LineWalkEnvConfig;

    fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
        crate::error::ensure_config(config.n_cells > 0, "n_cells must be positive")?;
        Ok(Self {
            n_cells: config.n_cells,
            cell: 0,
        })
    }

    fn reset(&mut self) -> Result<Obs> {
        self.cell = 0;
        Ok(self.obs())
    }

    fn step(&mut self, act: usize) -> Result<(Step, Record)> {
        match act {
            0 => self.cell = self.cell.saturating_sub(1),
            _ => self.cell = (self.cell + 1).min(self.n_cells),
        }
        let is_terminated = self.cell == self.n_cells;
        Ok((
            Step::new(self.obs(), -1.0, is_terminated, false),
            Record::empty(),
        ))
    }

    fn action_space(&self) -> Space {
        Space::Discrete(2)
    }

    fn observation_space(&self) -> Space {
        Space::Box {
            low: vec![0.0],
            high: vec![1.0],
        }
    }
}
