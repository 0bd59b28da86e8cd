//! Episode buffer shared by Monte Carlo agents.
use std::collections::HashSet;

/// One `(state, action, reward)` step of an episode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EpisodeStep {
    /// State index.
    pub state: usize,

    /// Action index.
    pub act: usize,

    /// Reward received after the action.
    pub reward: f32,
}

/// A step annotated with its discounted return.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Credit {
    /// State index.
    pub state: usize,

    /// Action index.
    pub act: usize,

    /// Discounted return from this step to the end of the episode.
    pub ret: f32,

    /// `false` if first-visit mode skips this occurrence of the pair.
    pub eligible: bool,
}

/// Steps of the current episode.
#[derive(Clone, Debug, Default)]
pub struct EpisodeBuffer {
    steps: Vec<EpisodeStep>,
}

impl EpisodeBuffer {
    /// Appends a step.
    pub fn push(&mut self, state: usize, act: usize, reward: f32) {
        self.steps.push(EpisodeStep { state, act, reward });
    }

    /// Removes all steps.
    pub fn clear(&mut self) {
        self.steps.clear();
    }

    /// Number of buffered steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns `true` if no step is buffered.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Returns the steps from the last to the first with their returns.
    ///
    /// In first-visit mode only the earliest occurrence of each pair is eligible.
    pub fn backward(&self, gamma: f32, first_visit: bool) -> Vec<Credit> {
        let mut seen = HashSet::new();
        let first: Vec<bool> = self
            .steps
            .iter()
            .map(|st| seen.insert((st.state, st.act)))
            .collect();

        let mut ret = 0.0;
        self.steps
            .iter()
            .zip(first)
            .rev()
            .map(|(st, is_first)| {
                ret = st.reward + gamma * ret;
                Credit {
                    state: st.state,
                    act: st.act,
                    ret,
                    eligible: is_first || !first_visit,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_backward_returns() {
        let mut buf = EpisodeBuffer::default();
        buf.push(0, 0, 1.0);
        buf.push(1, 0, 2.0);
        buf.push(0, 0, 4.0);

        let credits = buf.backward(0.5, true);
        let rets: Vec<f32> = credits.iter().map(|c| c.ret).collect();
        assert_eq!(rets, vec![4.0, 4.0, 3.0]);
        let eligible: Vec<bool> = credits.iter().map(|c| c.eligible).collect();
        assert_eq!(eligible, vec![false, true, true]);

        assert!(buf.backward(0.5, false).iter().all(|c| c.eligible));
    }
}
