//! Utilities for interaction of agents and environments.
use crate::{Agent, Env, Transition};
use anyhow::Result;
use log::info;

/// Index of the first maximum of `values`.
///
/// Returns 0 for an empty slice. NaN entries never win.
pub fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] || (values[best].is_nan() && !v.is_nan()) {
            best = i;
        }
    }
    best
}

/// Runs one episode and returns its total reward.
///
/// The episode ends when the environment terminates or truncates, or after
/// `max_steps` steps. Every transition is passed to [`Agent::update`] with
/// `is_done` set only on termination, so that truncation never cuts the
/// bootstrap of TD targets.
pub fn run_episode<E, A>(env: &mut E, agent: &mut A, max_steps: usize) -> Result<f32>
where
    E: Env,
    A: Agent + ?Sized,
{
    let mut obs = env.reset()?;
    let mut total_reward = 0.0;
    agent.start_episode();

    for _ in 0..max_steps {
        let act = agent.get_action(&obs)?;
        let (step, info) = env.step(act)?;
        total_reward += step.reward;
        let tr = Transition::new(
            obs,
            act,
            step.reward,
            step.obs.clone(),
            step.is_terminated,
        );
        agent.update(&tr, &info)?;
        obs = step.obs.clone();

        if step.is_done() {
            break;
        }
    }

    agent.end_episode(total_reward)?;
    Ok(total_reward)
}

/// Runs `n_episodes` episodes, decaying exploration after each one.
///
/// Returns the total reward of every episode.
pub fn train<E, A>(
    env: &mut E,
    agent: &mut A,
    n_episodes: usize,
    max_steps: usize,
) -> Result<Vec<f32>>
where
    E: Env,
    A: Agent + ?Sized,
{
    let log_interval = (n_episodes / 10).max(1);
    let mut rewards = Vec::with_capacity(n_episodes);

    for episode in 0..n_episodes {
        rewards.push(run_episode(env, agent, max_steps)?);
        agent.decay_exploration();

        if (episode + 1) % log_interval == 0 {
            let recent = &rewards[rewards.len().saturating_sub(log_interval)..];
            let mean = recent.iter().sum::<f32>() / recent.len() as f32;
            info!(
                "episode = {}/{}, mean reward = {:.3}, total steps = {}",
                episode + 1,
                n_episodes,
                mean,
                agent.stats().total_steps
            );
        }
    }

    Ok(rewards)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_argmax_first_index() {
        assert_eq!(argmax(&[1.0, 3.0, 3.0, 2.0]), 1);
        assert_eq!(argmax(&[-1.0]), 0);
        assert_eq!(argmax(&[f32::NAN, 0.5]), 1);
        assert_eq!(argmax(&[]), 0);
    }
}
