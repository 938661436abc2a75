//! Audience help: viewers grant a random temporary boost to a tank
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::Instant;

use crate::ports::{Avatar, BoostStat};
use crate::types::SlotColor;

/// Hit points restored by a health boost
pub const HEALTH_BOOST: f32 = 20.0;
/// Multiplier applied by a stat boost
pub const STAT_BOOST: f32 = 2.0;

/// A boost a viewer can grant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boost {
    Health,
    Stat(BoostStat),
}

impl Boost {
    pub const ALL: [Boost; 4] = [
        Boost::Health,
        Boost::Stat(BoostStat::Speed),
        Boost::Stat(BoostStat::Attack),
        Boost::Stat(BoostStat::Defence),
    ];

    pub fn label(self) -> &'static str {
        match self {
            Boost::Health => "20HP",
            Boost::Stat(BoostStat::Speed) => "speed boost",
            Boost::Stat(BoostStat::Attack) => "attack boost",
            Boost::Stat(BoostStat::Defence) => "defense boost",
        }
    }
}

/// Outcome of one help press
#[derive(Debug, Clone, PartialEq)]
pub struct GrantedBoost {
    pub boost: Boost,
    /// Announcement for the viewer and player labels
    pub message: String,
}

struct PendingBoost {
    expires_at: Instant,
    slot: SlotColor,
    stat: BoostStat,
    avatar: Arc<dyn Avatar>,
    recipient: String,
}

/// Grants boosts and reverts them once their cooldown runs out
///
/// Expiry is driven by the owner calling [`HelpManager::expire_due`], so
/// reverts happen on the same task as the rest of the game.
pub struct HelpManager<R = StdRng> {
    rng: R,
    cooldown: Duration,
    pending: Vec<PendingBoost>,
}

impl<R> std::fmt::Debug for HelpManager<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HelpManager")
            .field("cooldown", &self.cooldown)
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl HelpManager<StdRng> {
    pub fn new(cooldown: Duration) -> Self {
        Self::with_rng(StdRng::from_os_rng(), cooldown)
    }
}

impl<R: Rng> HelpManager<R> {
    pub fn with_rng(rng: R, cooldown: Duration) -> Self {
        Self {
            rng,
            cooldown,
            pending: Vec::new(),
        }
    }

    /// Apply a random boost to `avatar` on behalf of `helper`
    ///
    /// A stat boost granted while the same stat is still boosted on that
    /// slot restarts its cooldown.
    pub fn give_help(
        &mut self,
        slot: SlotColor,
        avatar: &Arc<dyn Avatar>,
        recipient: &str,
        helper: &str,
        now: Instant,
    ) -> GrantedBoost {
        let boost = Boost::ALL[self.rng.random_range(0..Boost::ALL.len())];

        match boost {
            Boost::Health => avatar.increase_health(HEALTH_BOOST),
            Boost::Stat(stat) => {
                avatar.set_multiplier(stat, STAT_BOOST);
                self.pending
                    .retain(|pending| !(pending.slot == slot && pending.stat == stat));
                self.pending.push(PendingBoost {
                    expires_at: now + self.cooldown,
                    slot,
                    stat,
                    avatar: avatar.clone(),
                    recipient: recipient.to_string(),
                });
            }
        }

        tracing::info!("{} gave {} to {} player {}", helper, boost.label(), slot, recipient);
        GrantedBoost {
            boost,
            message: format!("{} gave {} to {}!", helper, boost.label(), recipient),
        }
    }

    /// Earliest pending expiry
    pub fn next_expiry(&self) -> Option<Instant> {
        self.pending.iter().map(|pending| pending.expires_at).min()
    }

    /// Revert every boost whose cooldown elapsed; returns the announcements
    pub fn expire_due(&mut self, now: Instant) -> Vec<String> {
        let (due, keep): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|pending| pending.expires_at <= now);
        self.pending = keep;

        due.into_iter()
            .map(|pending| {
                pending.avatar.set_multiplier(pending.stat, 1.0);
                let label = Boost::Stat(pending.stat).label();
                tracing::debug!("{} of {} player wore off", label, pending.slot);
                format!("{}'s {} has worn off!", pending.recipient, label)
            })
            .collect()
    }

    /// Forget pending boosts without reverting them (avatars are gone)
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockAvatar;

    fn manager(seed: u64) -> HelpManager {
        HelpManager::with_rng(StdRng::seed_from_u64(seed), Duration::from_secs(10))
    }

    #[test]
    fn test_boost_labels() {
        let labels: Vec<_> = Boost::ALL.iter().map(|boost| boost.label()).collect();
        assert_eq!(labels, ["20HP", "speed boost", "attack boost", "defense boost"]);
    }

    #[test]
    fn test_give_help_applies_and_announces() {
        let mut help = manager(7);
        let mock = Arc::new(MockAvatar::default());
        let avatar: Arc<dyn Avatar> = mock.clone();
        let now = Instant::now();

        for _ in 0..32 {
            let granted = help.give_help(SlotColor::Red, &avatar, "alice", "viewer", now);
            assert_eq!(
                granted.message,
                format!("viewer gave {} to alice!", granted.boost.label())
            );
            match granted.boost {
                Boost::Health => {}
                Boost::Stat(stat) => assert_eq!(mock.multiplier(stat), STAT_BOOST),
            }
        }

        let healed = mock.state.lock().unwrap().health_received;
        assert_eq!(healed % HEALTH_BOOST, 0.0);
        // At most one pending entry per stat
        assert!(help.pending_count() <= 3);
    }

    #[test]
    fn test_stat_boost_expires() {
        let mut help = manager(1);
        let mock = Arc::new(MockAvatar::default());
        let avatar: Arc<dyn Avatar> = mock.clone();
        let start = Instant::now();

        let granted_at = start + Duration::from_secs(1);
        // Draw until a stat boost comes up
        let stat = loop {
            if let Boost::Stat(stat) =
                help.give_help(SlotColor::Blue, &avatar, "bob", "viewer", granted_at).boost
            {
                break stat;
            }
        };
        assert_eq!(help.pending_count(), 1);

        assert_eq!(help.next_expiry(), Some(granted_at + Duration::from_secs(10)));
        assert!(help.expire_due(granted_at + Duration::from_secs(9)).is_empty());

        let messages = help.expire_due(granted_at + Duration::from_secs(10));
        assert_eq!(
            messages,
            vec![format!("bob's {} has worn off!", Boost::Stat(stat).label())]
        );
        assert_eq!(mock.multiplier(stat), 1.0);
        assert_eq!(help.next_expiry(), None);
    }
}
