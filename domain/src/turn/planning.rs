//! Turn planning: split a group's workers into must-respond and may-respond.
//!
//! | Trigger | must-respond | may-respond |
//! |---------|--------------|-------------|
//! | no mention | ∅ | every worker |
//! | `@worker` mentions | mentioned workers | the rest |
//! | everyone token | every worker | ∅ |
//! | chained mentions | next mentions | the rest, minus already-replied when re-invocation is off |
//!
//! Both lists are in roster order, which is also the order Phase B fills its
//! responder slots.

use crate::core::ids::WorkerId;
use crate::group::entities::Group;
use crate::mention::resolver::MentionResolution;
use std::collections::BTreeSet;

/// The worker partition for one turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnPlan {
    pub must_respond: Vec<WorkerId>,
    pub may_respond: Vec<WorkerId>,
}

impl TurnPlan {
    /// Plan for the turn triggered directly by a human message.
    pub fn initial(resolution: &MentionResolution, group: &Group) -> Self {
        let workers = group.worker_ids();
        if resolution.everyone {
            return Self {
                must_respond: workers,
                may_respond: Vec::new(),
            };
        }
        let (must_respond, may_respond) = workers
            .into_iter()
            .partition(|w| resolution.workers.contains(w));
        Self {
            must_respond,
            may_respond,
        }
    }

    /// Plan for a chained turn.
    ///
    /// `next_mentions` is expected to already exclude workers that policy
    /// forbids re-invoking; `excluded` removes them from the may-respond side.
    pub fn successor(
        next_mentions: &BTreeSet<WorkerId>,
        excluded: &BTreeSet<WorkerId>,
        group: &Group,
    ) -> Self {
        let mut must_respond = Vec::new();
        let mut may_respond = Vec::new();
        for worker in group.worker_ids() {
            if next_mentions.contains(&worker) {
                must_respond.push(worker);
            } else if !excluded.contains(&worker) {
                may_respond.push(worker);
            }
        }
        Self {
            must_respond,
            may_respond,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.must_respond.is_empty() && self.may_respond.is_empty()
    }

    /// Union of both sides.
    pub fn all(&self) -> BTreeSet<WorkerId> {
        self.must_respond
            .iter()
            .chain(self.may_respond.iter())
            .cloned()
            .collect()
    }
}
