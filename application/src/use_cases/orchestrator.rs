//! Orchestrator use case (the turn loop)
//!
//! Turns an incoming message into a chain of turns:
//!
//! ```text
//! Idle -> TurnRunning -> NextTurnRunning ... -> Quiescent | ChainLimitReached -> Idle
//! ```
//!
//! A chain continues while the last turn produced next mentions and its depth
//! is below the group's `chain_depth_limit`. A limit of `L` therefore runs at
//! most `L + 1` turns.
//!
//! Loops are serialized per group; different groups run independently.

use super::turn_executor::TurnExecutor;
use crate::ports::conversation_logger::{ConversationEvent, event_types};
use huddle_domain::{
    CHAIN_TRIGGER, ChainReport, ChainState, Group, GroupId, Message, Turn, TurnPlan, WorkerId,
    resolve_attached, resolve_mentions,
};
use serde_json::json;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

/// System notice emitted when a chain stops at its depth limit.
pub const CHAIN_LIMIT_NOTICE: &str = "chain limit reached, awaiting human input";

/// Use case driving the turn loop for every group
pub struct Orchestrator {
    executor: Arc<TurnExecutor>,
    group_locks: GroupLocks,
    active_loops: Arc<ActiveLoops>,
}

impl Orchestrator {
    pub fn new(executor: TurnExecutor) -> Self {
        Self {
            executor: Arc::new(executor),
            group_locks: Mutex::new(HashMap::new()),
            active_loops: Arc::new(ActiveLoops::default()),
        }
    }

    pub fn executor(&self) -> &TurnExecutor {
        &self.executor
    }

    /// Handle a new message posted to `group`.
    ///
    /// The message is appended to the log, then the turn chain runs to
    /// completion. A second message for the same group waits until this
    /// chain has finished.
    pub async fn on_new_message(&self, message: Message, group: &Group) -> ChainReport {
        let lease = self.group_lock(group.id());
        let _serialized = lease.lock.lock().await;
        let _active = self.active_loops.enter(group.id());

        // Snapshot: config edits apply to the next message only
        let group = group.clone();
        let config = group.config().clone();

        let count_before = self.count(group.id()).await;
        if let Err(e) = self.executor.log().append(&message).await {
            warn!("Failed to append message {}: {}", message.id, e);
        }
        self.executor.notifier().emit_message(&message);
        self.executor
            .conversation_logger()
            .log(ConversationEvent::new(
                event_types::MESSAGE_RECEIVED,
                json!({
                    "group_id": group.id(),
                    "message_id": message.id,
                    "author": message.author_id,
                    "content": message.content,
                }),
            ));

        let mut report = ChainReport {
            group_id: group.id().clone(),
            outcomes: Vec::new(),
            final_state: ChainState::Quiescent,
        };

        if group.workers().next().is_none() {
            debug!("Group {} has no workers", group.id());
            self.finish(&group, &report, count_before).await;
            return report;
        }

        let resolution = if message.mentions.is_empty() {
            resolve_mentions(&message.content, group.members())
        } else {
            resolve_attached(
                message.mentions.iter().map(WorkerId::as_str),
                group.members(),
            )
        };

        let mut plan = TurnPlan::initial(&resolution, &group);
        let mut depth = 0;
        let mut trigger = message.author_id.clone();
        let mut already_replied: BTreeSet<WorkerId> = BTreeSet::new();
        let mut state = ChainState::TurnRunning;

        loop {
            debug!(
                "Group {} [{}] depth {}: must={:?} may={:?}",
                group.id(),
                state.as_str(),
                depth,
                plan.must_respond,
                plan.may_respond
            );
            let turn = Turn::new(plan, depth, trigger, already_replied.clone(), &config);
            let outcome = self.executor.execute(&turn, &group).await;
            info!(
                "Group {} turn {} done: {} replies, {} next mentions",
                group.id(),
                depth,
                outcome.replied.len(),
                outcome.next_mentions.len()
            );

            already_replied.extend(outcome.invoked.iter().cloned());
            let next_mentions = outcome.next_mentions.clone();
            report.outcomes.push(outcome);

            if next_mentions.is_empty() {
                state = ChainState::Quiescent;
                break;
            }
            if depth >= config.chain_depth_limit {
                info!(
                    "Group {}: chain limit {} reached",
                    group.id(),
                    config.chain_depth_limit
                );
                let notice = Message::system(group.id().clone(), CHAIN_LIMIT_NOTICE);
                if let Err(e) = self.executor.log().append(&notice).await {
                    warn!("Failed to append chain limit notice: {}", e);
                }
                self.executor
                    .notifier()
                    .emit_system(group.id(), CHAIN_LIMIT_NOTICE);
                state = ChainState::ChainLimitReached;
                break;
            }

            let excluded = if config.re_invoke_already_replied {
                BTreeSet::new()
            } else {
                already_replied.clone()
            };
            plan = TurnPlan::successor(&next_mentions, &excluded, &group);
            depth += 1;
            trigger = CHAIN_TRIGGER.to_string();
            state = ChainState::NextTurnRunning;
        }

        report.final_state = state;
        self.finish(&group, &report, count_before).await;
        report
    }

    async fn finish(&self, group: &Group, report: &ChainReport, count_before: usize) {
        info!(
            "Group {} chain finished: {} turns, {}",
            group.id(),
            report.turns_executed(),
            report.final_state.as_str()
        );
        self.executor
            .conversation_logger()
            .log(ConversationEvent::new(
                event_types::CHAIN_FINISHED,
                json!({
                    "group_id": group.id(),
                    "turns": report.turns_executed(),
                    "final_state": report.final_state.as_str(),
                }),
            ));

        let interval = group.config().auto_summary_interval;
        if interval == 0 {
            return;
        }
        let count_after = self.count(group.id()).await;
        if count_after / interval > count_before / interval {
            debug!("Group {}: requesting summary", group.id());
            let memory = Arc::clone(self.executor.memory());
            let group_id = group.id().clone();
            tokio::spawn(async move {
                memory.summarize(&group_id).await;
            });
        }
    }

    async fn count(&self, group_id: &GroupId) -> usize {
        match self.executor.log().count(group_id).await {
            Ok(count) => count,
            Err(e) => {
                warn!("Failed to count messages for {}: {}", group_id, e);
                0
            }
        }
    }

    fn group_lock(&self, group_id: &GroupId) -> GroupLockLease<'_> {
        let mut locks = self
            .group_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        GroupLockLease {
            locks: &self.group_locks,
            group_id: group_id.clone(),
            lock: Arc::clone(locks.entry(group_id.clone()).or_default()),
        }
    }
}

type GroupLocks = Mutex<HashMap<GroupId, Arc<tokio::sync::Mutex<()>>>>;

/// A handle on a group's lock; the entry is dropped from the map once the
/// last handle goes away, so idle groups do not accumulate.
struct GroupLockLease<'a> {
    locks: &'a GroupLocks,
    group_id: GroupId,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl Drop for GroupLockLease<'_> {
    fn drop(&mut self) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // Handles are only cloned under the map lock: two owners means the
        // map and this lease, with nobody waiting.
        let idle = locks
            .get(&self.group_id)
            .is_some_and(|l| Arc::ptr_eq(l, &self.lock) && Arc::strong_count(l) == 2);
        if idle {
            locks.remove(&self.group_id);
        }
    }
}

/// Registry of groups with a running turn loop.
///
/// Entering a group that is already active is a programmer error: the
/// per-group lock must make it impossible.
#[derive(Default)]
struct ActiveLoops {
    groups: Mutex<HashSet<GroupId>>,
}

impl ActiveLoops {
    fn enter(self: &Arc<Self>, group_id: &GroupId) -> ActiveLoopGuard {
        let inserted = self
            .groups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(group_id.clone());
        assert!(inserted, "turn loop already active for group {group_id}");
        ActiveLoopGuard {
            loops: Arc::clone(self),
            group_id: group_id.clone(),
        }
    }
}

struct ActiveLoopGuard {
    loops: Arc<ActiveLoops>,
    group_id: GroupId,
}

impl Drop for ActiveLoopGuard {
    fn drop(&mut self) {
        self.loops
            .groups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.group_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::*;
    use huddle_domain::{GroupConfig, InvocationKind, Member};
    use std::sync::atomic::Ordering;
    use std::time::Duration;
    use tokio::time::Instant;

    struct Harness {
        invoker: Arc<MockInvoker>,
        log: Arc<MockLog>,
        sink: Arc<RecordingSink>,
        memory: Arc<RecordingMemory>,
        orchestrator: Orchestrator,
    }

    fn harness(invoker: MockInvoker) -> Harness {
        let invoker = Arc::new(invoker);
        let log = Arc::new(MockLog::default());
        let sink = Arc::new(RecordingSink::default());
        let memory = Arc::new(RecordingMemory::default());
        let executor = TurnExecutor::new(
            invoker.clone(),
            Arc::new(LogContext::new(log.clone())),
            log.clone(),
        )
        .with_notifier(sink.clone())
        .with_memory(memory.clone());
        Harness {
            invoker,
            log,
            sink,
            memory,
            orchestrator: Orchestrator::new(executor),
        }
    }

    fn from_alice(group: &Group, text: &str) -> Message {
        Message::human(group.id().clone(), "alice", "Alice", text)
    }

    /// Mentioned workers reply and pass the mention along; may-respond
    /// workers stay quiet.
    fn relay(next: &'static str) -> impl Fn(&huddle_domain::WorkerInput) -> Script {
        move |input| {
            if input.is_may_respond() {
                return Script::skip();
            }
            let target = if input.worker_id.as_str() == next { "bot1" } else { next };
            Script::reply(format!(
                "{} handing over <!--NEXT_MENTIONS:[\"{}\"]-->",
                input.worker_id, target
            ))
        }
    }

    #[tokio::test]
    async fn test_single_turn_without_mentions_goes_quiescent() {
        let group = group_with("g1", &["bot1", "bot2"], GroupConfig::default());
        let h = harness(MockInvoker::acknowledging());

        let report = h
            .orchestrator
            .on_new_message(from_alice(&group, "morning"), &group)
            .await;

        assert_eq!(report.turns_executed(), 1);
        assert_eq!(report.final_state, ChainState::Quiescent);
        assert_eq!(h.log.all()[0].content, "morning");
        assert_eq!(h.log.all().len(), 3);
    }

    #[tokio::test]
    async fn test_chain_limit_stops_after_limit_plus_one_turns() {
        let config = GroupConfig::default()
            .with_chain_depth_limit(1)
            .with_re_invoke_already_replied(true);
        let group = group_with("g1", &["bot1", "bot2"], config);
        let h = harness(MockInvoker::new(relay("bot2")));

        let report = h
            .orchestrator
            .on_new_message(from_alice(&group, "@bot1 start"), &group)
            .await;

        assert_eq!(report.turns_executed(), 2);
        assert!(report.hit_chain_limit());
        assert_eq!(h.sink.system_notices(), vec![CHAIN_LIMIT_NOTICE]);
        assert_eq!(h.log.all().last().unwrap().content, CHAIN_LIMIT_NOTICE);

        let must: Vec<_> = h
            .invoker
            .invoked()
            .into_iter()
            .filter(|(_, kind)| *kind == InvocationKind::MustRespond)
            .map(|(w, _)| w)
            .collect();
        assert_eq!(must, vec!["bot1", "bot2"]);
    }

    #[tokio::test]
    async fn test_chain_never_exceeds_limit() {
        for limit in 0..4 {
            let config = GroupConfig::default()
                .with_chain_depth_limit(limit)
                .with_re_invoke_already_replied(true);
            let group = group_with("g1", &["bot1", "bot2"], config);
            let h = harness(MockInvoker::new(relay("bot2")));

            let report = h
                .orchestrator
                .on_new_message(from_alice(&group, "@bot1 go"), &group)
                .await;

            assert_eq!(report.turns_executed(), limit as usize + 1);
            assert!(report.outcomes.iter().all(|o| o.depth <= limit));
        }
    }

    #[tokio::test]
    async fn test_already_replied_excluded_from_next_turn() {
        let group = group_with("g1", &["bot1", "bot2"], GroupConfig::default());
        let h = harness(MockInvoker::new(|input| match input.worker_id.as_str() {
            "bot1" => Script::reply("me and bot2 <!--NEXT_MENTIONS:[\"bot1\",\"bot2\"]-->"),
            _ if input.is_may_respond() => Script::skip(),
            _ => Script::reply("bot2 reporting"),
        }));

        let report = h
            .orchestrator
            .on_new_message(from_alice(&group, "@bot1 plan"), &group)
            .await;

        // bot2 declined in turn 0, which counts as having been invoked
        assert_eq!(report.turns_executed(), 1);
        assert!(report.outcomes[0].next_mentions.is_empty());
    }

    #[tokio::test]
    async fn test_self_mention_excluded_when_reinvocation_forbidden() {
        let group = group_with("g1", &["bot1", "bot2", "bot3"], GroupConfig::default());
        let h = harness(MockInvoker::new(|input| match input.worker_id.as_str() {
            "bot1" => Script::reply("me again, and bot3 <!--NEXT_MENTIONS:[\"bot1\",\"bot3\"]-->"),
            "bot3" if !input.is_may_respond() => Script::reply("bot3 here"),
            _ => Script::skip(),
        }));
        // bot3 is not invoked in turn 0 because the cap leaves one slot for bot2
        let group = group
            .with_config(GroupConfig::default().with_max_responders(2))
            .unwrap();

        let report = h
            .orchestrator
            .on_new_message(from_alice(&group, "@bot1 plan"), &group)
            .await;

        assert_eq!(report.turns_executed(), 2);
        let second = &report.outcomes[1];
        let must: Vec<_> = h
            .invoker
            .calls()
            .into_iter()
            .filter(|c| c.turn_id == second.turn_id)
            .filter(|c| c.invocation == InvocationKind::MustRespond)
            .map(|c| c.worker_id.to_string())
            .collect();
        assert_eq!(must, vec!["bot3"]);
        assert!(!second.invoked.contains("bot1"));
    }

    #[tokio::test]
    async fn test_everyone_token_makes_all_workers_must_respond() {
        let group = group_with("g1", &["bot1", "bot2"], GroupConfig::default());
        let h = harness(MockInvoker::acknowledging());

        h.orchestrator
            .on_new_message(from_alice(&group, "@所有人 status?"), &group)
            .await;

        let kinds: Vec<_> = h.invoker.invoked().into_iter().map(|(_, k)| k).collect();
        assert_eq!(kinds, vec![InvocationKind::MustRespond; 2]);
    }

    #[tokio::test]
    async fn test_attached_mentions_take_precedence() {
        let group = group_with("g1", &["bot1", "bot2"], GroupConfig::default());
        let h = harness(MockInvoker::new(|input| {
            if input.is_may_respond() {
                Script::skip()
            } else {
                Script::reply("ok")
            }
        }));
        let message = from_alice(&group, "@bot1 please").with_mentions([WorkerId::from("bot2")]);

        h.orchestrator.on_new_message(message, &group).await;

        let must: Vec<_> = h
            .invoker
            .invoked()
            .into_iter()
            .filter(|(_, kind)| *kind == InvocationKind::MustRespond)
            .map(|(w, _)| w)
            .collect();
        assert_eq!(must, vec!["bot2"]);
    }

    #[tokio::test]
    async fn test_group_without_workers_is_quiescent() {
        let group = Group::new(
            "g1",
            "humans only",
            vec![Member::human("alice", "Alice"), Member::human("bob", "Bob")],
            GroupConfig::default(),
        )
        .unwrap();
        let h = harness(MockInvoker::acknowledging());

        let report = h
            .orchestrator
            .on_new_message(from_alice(&group, "@bob hi"), &group)
            .await;

        assert_eq!(report.turns_executed(), 0);
        assert_eq!(report.final_state, ChainState::Quiescent);
        assert!(h.invoker.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_group_messages_are_serialized() {
        let group = group_with("g1", &["bot1"], GroupConfig::default());
        let h = harness(MockInvoker::new(|_| {
            Script::reply("working").after(Duration::from_millis(100))
        }));

        let started = Instant::now();
        tokio::join!(
            h.orchestrator
                .on_new_message(from_alice(&group, "@bot1 first"), &group),
            h.orchestrator
                .on_new_message(from_alice(&group, "@bot1 second"), &group),
        );

        assert_eq!(h.invoker.max_concurrency(), 1);
        assert!(started.elapsed() >= Duration::from_millis(200));
        let contents = h.log.contents();
        assert_eq!(contents, vec!["@bot1 first", "working", "@bot1 second", "working"]);
        assert!(h.orchestrator.group_locks.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_different_groups_run_concurrently() {
        let first = group_with("g1", &["bot1"], GroupConfig::default());
        let second = group_with("g2", &["bot1"], GroupConfig::default());
        let h = harness(MockInvoker::new(|_| {
            Script::reply("working").after(Duration::from_millis(100))
        }));

        let started = Instant::now();
        tokio::join!(
            h.orchestrator
                .on_new_message(from_alice(&first, "@bot1 a"), &first),
            h.orchestrator
                .on_new_message(from_alice(&second, "@bot1 b"), &second),
        );

        assert_eq!(h.invoker.max_concurrency(), 2);
        assert!(started.elapsed() < Duration::from_millis(200));
        assert!(h.orchestrator.group_locks.lock().unwrap().is_empty());
    }

    #[test]
    fn test_group_lock_kept_while_another_caller_holds_it() {
        let h = harness(MockInvoker::acknowledging());
        let group_id = GroupId::from("g1");

        let first = h.orchestrator.group_lock(&group_id);
        let second = h.orchestrator.group_lock(&group_id);
        assert!(Arc::ptr_eq(&first.lock, &second.lock));

        drop(first);
        assert_eq!(h.orchestrator.group_locks.lock().unwrap().len(), 1);
        drop(second);
        assert!(h.orchestrator.group_locks.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_summary_requested_when_interval_crossed() {
        let config = GroupConfig::default().with_auto_summary_interval(2);
        let group = group_with("g1", &["bot1"], config);
        let h = harness(MockInvoker::acknowledging());

        h.orchestrator
            .on_new_message(from_alice(&group, "@bot1 hi"), &group)
            .await;
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }

        assert_eq!(h.memory.summaries.load(Ordering::SeqCst), 1);
    }

    #[test]
    #[should_panic(expected = "turn loop already active")]
    fn test_second_active_loop_panics() {
        let loops = Arc::new(ActiveLoops::default());
        let group_id = GroupId::from("g1");
        let _first = loops.enter(&group_id);
        let _second = loops.enter(&group_id);
    }

    #[test]
    fn test_active_loop_released_on_drop() {
        let loops = Arc::new(ActiveLoops::default());
        let group_id = GroupId::from("g1");
        drop(loops.enter(&group_id));
        let _again = loops.enter(&group_id);
    }
}
