//! Turn Executor use case
//!
//! Runs one turn in two phases:
//!
//! 1. **Phase A** - every must-respond worker is invoked concurrently. None of
//!    them sees another's Phase A output. All Phase A replies are committed to
//!    the log before Phase B starts.
//! 2. **Phase B** - the remaining may-respond workers are invoked concurrently
//!    against the updated log. Each may decline with `SKIP`. Phase B gets
//!    `max_responders - replies_in_phase_a` slots in roster order; the
//!    supervisor does not take a slot.
//!
//! Every invocation runs under its own deadline. A timeout or failure only
//! affects that worker's result.

use crate::ports::context_assembler::ContextAssembler;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger, event_types,
};
use crate::ports::memory::{MemoryPort, NoMemory};
use crate::ports::message_log::MessageLog;
use crate::ports::notification::{NoNotifications, NotificationSink};
use crate::ports::worker_invoker::WorkerInvoker;
use huddle_domain::{
    AuthorKind, Group, InvocationKind, InvocationStatus, Message, Turn, TurnOutcome, WorkerId,
    WorkerInvocationResult, WorkerStatus,
};
use serde_json::json;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Posted for a must-respond worker that answered with nothing to say.
pub const NO_COMMENT_REPLY: &str = "(no comment)";

/// Use case for executing a single turn
pub struct TurnExecutor {
    invoker: Arc<dyn WorkerInvoker>,
    context: Arc<dyn ContextAssembler>,
    log: Arc<dyn MessageLog>,
    memory: Arc<dyn MemoryPort>,
    notifier: Arc<dyn NotificationSink>,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl TurnExecutor {
    pub fn new(
        invoker: Arc<dyn WorkerInvoker>,
        context: Arc<dyn ContextAssembler>,
        log: Arc<dyn MessageLog>,
    ) -> Self {
        Self {
            invoker,
            context,
            log,
            memory: Arc::new(NoMemory),
            notifier: Arc::new(NoNotifications),
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_memory(mut self, memory: Arc<dyn MemoryPort>) -> Self {
        self.memory = memory;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn NotificationSink>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub(crate) fn log(&self) -> &Arc<dyn MessageLog> {
        &self.log
    }

    pub(crate) fn memory(&self) -> &Arc<dyn MemoryPort> {
        &self.memory
    }

    pub(crate) fn notifier(&self) -> &Arc<dyn NotificationSink> {
        &self.notifier
    }

    pub(crate) fn conversation_logger(&self) -> &Arc<dyn ConversationLogger> {
        &self.conversation_logger
    }

    /// Execute both phases of `turn` and aggregate the chained mentions.
    pub async fn execute(&self, turn: &Turn, group: &Group) -> TurnOutcome {
        info!(
            "Turn {} (depth {}): {} must-respond, {} may-respond",
            turn.id(),
            turn.depth(),
            turn.must_respond().len(),
            turn.may_respond().len()
        );
        self.conversation_logger.log(ConversationEvent::new(
            event_types::TURN_STARTED,
            json!({
                "group_id": group.id(),
                "turn_id": turn.id(),
                "depth": turn.depth(),
                "trigger": turn.trigger_source(),
                "must_respond": turn.must_respond(),
                "may_respond": turn.may_respond(),
            }),
        ));

        let mut outcome = TurnOutcome {
            turn_id: turn.id().clone(),
            depth: turn.depth(),
            results: Vec::new(),
            messages: Vec::new(),
            invoked: BTreeSet::new(),
            replied: BTreeSet::new(),
            next_mentions: BTreeSet::new(),
        };

        // Phase A: must-respond
        let must: Vec<WorkerId> = turn.must_respond().to_vec();
        self.run_phase(turn, group, &must, InvocationKind::MustRespond, &mut outcome)
            .await;

        // Phase B: may-respond, against the log including Phase A
        let may = self.select_may_respond(turn, &outcome);
        if may.is_empty() {
            debug!("Turn {}: no may-respond workers to invoke", turn.id());
        } else {
            self.run_phase(turn, group, &may, InvocationKind::MayRespond, &mut outcome)
                .await;
        }

        outcome.next_mentions = self.aggregate_mentions(turn, group, &outcome);
        debug!(
            "Turn {} finished: {} replies, next mentions {:?}",
            turn.id(),
            outcome.replied.len(),
            outcome.next_mentions
        );
        outcome
    }

    /// May-respond workers for Phase B, in roster order, capped by the
    /// slots Phase A left. The supervisor is always included.
    fn select_may_respond(&self, turn: &Turn, outcome: &TurnOutcome) -> Vec<WorkerId> {
        let slots = turn.max_responders().saturating_sub(outcome.replied.len());
        let mut taken = 0;
        let mut selected = Vec::new();
        for worker in turn.may_respond() {
            if outcome.invoked.contains(worker) || turn.is_excluded(worker) {
                continue;
            }
            if turn.supervisor() == Some(worker) {
                selected.push(worker.clone());
            } else if taken < slots {
                taken += 1;
                selected.push(worker.clone());
            }
        }
        if selected.len() < turn.may_respond().len() {
            debug!(
                "Phase B: {} of {} may-respond workers selected ({} slots)",
                selected.len(),
                turn.may_respond().len(),
                slots
            );
        }
        selected
    }

    /// Invoke `workers` concurrently and commit each result as it arrives.
    async fn run_phase(
        &self,
        turn: &Turn,
        group: &Group,
        workers: &[WorkerId],
        kind: InvocationKind,
        outcome: &mut TurnOutcome,
    ) {
        if workers.is_empty() {
            return;
        }
        debug!("Phase {}: invoking {:?}", kind, workers);

        let mut join_set = JoinSet::new();
        let mut pending = BTreeSet::new();

        for worker_id in workers {
            self.notifier
                .emit_status(group.id(), worker_id, WorkerStatus::Running);

            let input = match self
                .context
                .build_input(worker_id, turn, group, kind)
                .await
            {
                Ok(input) => input,
                Err(e) => {
                    warn!("Context for {} unavailable: {}", worker_id, e);
                    let result = WorkerInvocationResult::error(
                        worker_id.clone(),
                        kind,
                        e.to_string(),
                        std::time::Duration::ZERO,
                    );
                    self.commit(turn, group, result, outcome).await;
                    continue;
                }
            };

            let invoker = Arc::clone(&self.invoker);
            let worker = worker_id.clone();
            let timeout = turn.worker_timeout();
            pending.insert(worker_id.clone());
            join_set.spawn(async move {
                let started = Instant::now();
                let deadline = started + timeout;
                match tokio::time::timeout_at(deadline, invoker.invoke(&worker, input, deadline))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => WorkerInvocationResult::timeout(worker, kind, started.elapsed()),
                }
            });
        }

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(result) => {
                    pending.remove(&result.worker_id);
                    self.commit(turn, group, result, outcome).await;
                }
                Err(e) => warn!("Task join error: {}", e),
            }
        }

        // Tasks that panicked never reported back
        for worker_id in pending {
            let result = WorkerInvocationResult::error(
                worker_id,
                kind,
                "invocation task failed",
                std::time::Duration::ZERO,
            );
            self.commit(turn, group, result, outcome).await;
        }
    }

    /// Apply one invocation result: log, memory, notifications.
    async fn commit(
        &self,
        turn: &Turn,
        group: &Group,
        mut result: WorkerInvocationResult,
        outcome: &mut TurnOutcome,
    ) {
        let worker_id = result.worker_id.clone();
        let name = group.worker_display_name(&worker_id);

        // Mentioned workers never skip; a SKIP or empty answer still posts.
        if result.kind == InvocationKind::MustRespond && result.is_ok() {
            result.should_respond = true;
            if result.content.is_empty() {
                result.content = NO_COMMENT_REPLY.to_string();
            }
        }

        match result.status {
            InvocationStatus::Ok if result.should_respond => {
                info!("{} replied ({} chars)", worker_id, result.content.len());
                for note in &result.memory_notes {
                    self.memory.record(group.id(), note).await;
                }
                for entry in &result.personal_logs {
                    self.memory.append_personal_log(&worker_id, entry).await;
                }
                let message = Message::worker(
                    group.id().clone(),
                    turn.id().clone(),
                    &worker_id,
                    name,
                    result.content.clone(),
                )
                .with_mentions(result.next_mentions.iter().cloned())
                .with_metadata(json!({
                    "next_mentions": result.next_mentions,
                    "invocation": result.kind.as_str(),
                }));
                self.append(&message).await;
                outcome.messages.push(message);
                outcome.replied.insert(worker_id.clone());
                self.notifier
                    .emit_status(group.id(), &worker_id, WorkerStatus::Done);
            }
            InvocationStatus::Ok => {
                debug!("{} declined to respond", worker_id);
                self.notifier
                    .emit_status(group.id(), &worker_id, WorkerStatus::Skipped);
            }
            InvocationStatus::Timeout => {
                warn!("{} timed out", worker_id);
                let notice = Message::system(group.id().clone(), format!("{name} timed out"))
                    .with_turn(turn.id().clone());
                self.report_failure(group, &worker_id, WorkerStatus::Timeout, notice, outcome)
                    .await;
            }
            InvocationStatus::Error => {
                let detail = result.error.as_deref().unwrap_or("unknown error");
                warn!("{} failed: {}", worker_id, detail);
                let notice =
                    Message::system(group.id().clone(), format!("{name} failed: {detail}"))
                        .with_turn(turn.id().clone());
                self.report_failure(group, &worker_id, WorkerStatus::Error, notice, outcome)
                    .await;
            }
        }

        self.conversation_logger.log(ConversationEvent::new(
            event_types::WORKER_INVOCATION,
            json!({
                "group_id": group.id(),
                "turn_id": turn.id(),
                "worker_id": worker_id,
                "invocation": result.kind.as_str(),
                "status": result.status.as_str(),
                "should_respond": result.should_respond,
                "duration_ms": result.duration.as_millis() as u64,
                "content_length": result.content.len(),
                "error": result.error,
            }),
        ));

        outcome.invoked.insert(worker_id);
        outcome.results.push(result);
    }

    async fn report_failure(
        &self,
        group: &Group,
        worker_id: &WorkerId,
        status: WorkerStatus,
        notice: Message,
        outcome: &mut TurnOutcome,
    ) {
        self.append(&notice).await;
        self.notifier.emit_system(group.id(), &notice.content);
        self.notifier.emit_status(group.id(), worker_id, status);
        outcome.messages.push(notice);
    }

    /// Append a message and announce it. Store failures do not abort the turn.
    async fn append(&self, message: &Message) {
        if let Err(e) = self.log.append(message).await {
            warn!("Failed to append message {}: {}", message.id, e);
        }
        if message.author_kind != AuthorKind::System {
            self.notifier.emit_message(message);
        }
    }

    /// Union of next mentions from produced replies, restricted to group
    /// workers and minus workers policy forbids re-invoking.
    fn aggregate_mentions(
        &self,
        turn: &Turn,
        group: &Group,
        outcome: &TurnOutcome,
    ) -> BTreeSet<WorkerId> {
        outcome
            .results
            .iter()
            .filter(|r| r.produced_reply())
            .flat_map(|r| r.next_mentions.iter())
            .filter(|w| group.has_worker(w))
            .filter(|w| {
                turn.re_invoke_already_replied()
                    || !(turn.already_replied().contains(*w) || outcome.invoked.contains(*w))
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::*;
    use huddle_domain::{
        CHAIN_TRIGGER, GroupConfig, MentionResolution, TurnPlan, resolve_mentions,
    };
    use std::time::Duration;

    struct Harness {
        invoker: Arc<MockInvoker>,
        log: Arc<MockLog>,
        sink: Arc<RecordingSink>,
        memory: Arc<RecordingMemory>,
        logger: Arc<RecordingLogger>,
        executor: TurnExecutor,
    }

    fn harness(invoker: MockInvoker) -> Harness {
        harness_with_context(invoker, |log| LogContext::new(log))
    }

    fn harness_with_context(
        invoker: MockInvoker,
        context: impl FnOnce(Arc<MockLog>) -> LogContext,
    ) -> Harness {
        let invoker = Arc::new(invoker);
        let log = Arc::new(MockLog::default());
        let sink = Arc::new(RecordingSink::default());
        let memory = Arc::new(RecordingMemory::default());
        let logger = Arc::new(RecordingLogger::default());
        let executor = TurnExecutor::new(
            invoker.clone(),
            Arc::new(context(log.clone())),
            log.clone(),
        )
        .with_notifier(sink.clone())
        .with_memory(memory.clone())
        .with_conversation_logger(logger.clone());
        Harness {
            invoker,
            log,
            sink,
            memory,
            logger,
            executor,
        }
    }

    fn turn_for(text: &str, group: &Group) -> Turn {
        let resolution = resolve_mentions(text, group.members());
        Turn::new(
            TurnPlan::initial(&resolution, group),
            0,
            "alice",
            BTreeSet::new(),
            group.config(),
        )
    }

    #[tokio::test]
    async fn test_mentioned_worker_replies_and_others_may_decline() {
        let group = group_with("g1", &["bot1", "bot2"], GroupConfig::default());
        let h = harness(MockInvoker::new(|input| {
            if input.is_may_respond() {
                Script::skip()
            } else {
                Script::reply("on it")
            }
        }));

        let outcome = h.executor.execute(&turn_for("@bot1 do X", &group), &group).await;

        assert_eq!(
            h.invoker.invoked(),
            vec![
                ("bot1".to_string(), InvocationKind::MustRespond),
                ("bot2".to_string(), InvocationKind::MayRespond),
            ]
        );
        assert_eq!(outcome.replied, worker_ids(&["bot1"]).into_iter().collect());
        // Declined workers still count as invoked
        assert_eq!(
            outcome.invoked,
            worker_ids(&["bot1", "bot2"]).into_iter().collect()
        );
        assert_eq!(h.log.contents(), vec!["on it"]);
        assert_eq!(h.sink.statuses("bot2"), vec![WorkerStatus::Running, WorkerStatus::Skipped]);
        assert_eq!(h.sink.statuses("bot1"), vec![WorkerStatus::Running, WorkerStatus::Done]);
        assert!(outcome.next_mentions.is_empty());
    }

    #[tokio::test]
    async fn test_mentioned_worker_cannot_skip() {
        let group = group_with("g1", &["bot1", "bot2"], GroupConfig::default());
        let h = harness(MockInvoker::new(|input| {
            if input.is_may_respond() {
                Script::reply("bot2 chimes in")
            } else {
                Script::reply("SKIP <!--NEXT_MENTIONS:[\"bot2\"]-->")
            }
        }));

        let outcome = h.executor.execute(&turn_for("@bot1 do X", &group), &group).await;

        assert_eq!(
            outcome.replied,
            worker_ids(&["bot1", "bot2"]).into_iter().collect()
        );
        assert_eq!(h.sink.statuses("bot1"), vec![WorkerStatus::Running, WorkerStatus::Done]);
        assert_eq!(h.log.contents(), vec![NO_COMMENT_REPLY, "bot2 chimes in"]);
        let bot1 = outcome.result_for(&WorkerId::from("bot1")).unwrap();
        assert!(bot1.produced_reply());
        assert!(bot1.next_mentions.contains("bot2"));
    }

    #[tokio::test]
    async fn test_phase_a_output_visible_to_phase_b() {
        let group = group_with("g1", &["bot1", "bot2"], GroupConfig::default());
        let h = harness(MockInvoker::new(|input| {
            if input.is_may_respond() {
                Script::reply(format!("saw {} lines", input.transcript.len()))
            } else {
                Script::reply("phase a output")
            }
        }));

        h.executor.execute(&turn_for("@bot1 go", &group), &group).await;

        let calls = h.invoker.calls();
        let bot2 = calls.iter().find(|c| c.worker_id.as_str() == "bot2").unwrap();
        assert_eq!(bot2.transcript.len(), 1);
        assert_eq!(bot2.transcript[0].content, "phase a output");
        let bot1 = calls.iter().find(|c| c.worker_id.as_str() == "bot1").unwrap();
        assert!(bot1.transcript.is_empty());
    }

    #[tokio::test]
    async fn test_phase_a_workers_do_not_see_each_other() {
        let group = group_with("g1", &["bot1", "bot2", "bot3"], GroupConfig::default());
        let h = harness(MockInvoker::new(|input| {
            Script::reply(format!("{} saw {}", input.worker_id, input.transcript.len()))
        }));

        let outcome = h.executor.execute(&turn_for("@all hi", &group), &group).await;

        assert_eq!(outcome.replied.len(), 3);
        for call in h.invoker.calls() {
            assert_eq!(call.invocation, InvocationKind::MustRespond);
            assert!(call.transcript.is_empty());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_does_not_cascade_to_siblings() {
        let config = GroupConfig::default().with_turn_timeout_seconds(2);
        let group = group_with("g1", &["bot1", "bot2"], config);
        let h = harness(MockInvoker::new(|input| match input.worker_id.as_str() {
            "bot1" => Script::reply("too late").after(Duration::from_secs(10)),
            _ => Script::reply("done").after(Duration::from_millis(500)),
        }));

        let started = Instant::now();
        let outcome = h.executor.execute(&turn_for("@all status", &group), &group).await;

        assert!(started.elapsed() < Duration::from_secs(3));
        let bot1 = outcome.result_for(&WorkerId::from("bot1")).unwrap();
        assert_eq!(bot1.status, InvocationStatus::Timeout);
        assert!(bot1.content.is_empty());
        assert!(!bot1.should_respond);

        let bot2 = outcome.result_for(&WorkerId::from("bot2")).unwrap();
        assert_eq!(bot2.status, InvocationStatus::Ok);
        assert_eq!(bot2.content, "done");

        assert_eq!(h.sink.system_notices(), vec!["bot1 timed out"]);
        assert_eq!(
            h.sink.statuses("bot1"),
            vec![WorkerStatus::Running, WorkerStatus::Timeout]
        );
        assert!(h.log.contents().contains(&"bot1 timed out".to_string()));
    }

    #[tokio::test]
    async fn test_invoker_error_is_reported_and_turn_continues() {
        let group = group_with("g1", &["bot1", "bot2"], GroupConfig::default());
        let h = harness(MockInvoker::new(|input| match input.worker_id.as_str() {
            "bot1" => Script::fail("exit status 1"),
            _ => Script::reply("fine"),
        }));

        let outcome = h.executor.execute(&turn_for("@all go", &group), &group).await;

        let bot1 = outcome.result_for(&WorkerId::from("bot1")).unwrap();
        assert_eq!(bot1.status, InvocationStatus::Error);
        assert_eq!(h.sink.system_notices(), vec!["bot1 failed: exit status 1"]);
        assert_eq!(outcome.replied, worker_ids(&["bot2"]).into_iter().collect());
    }

    #[tokio::test]
    async fn test_context_error_skips_worker() {
        let group = group_with("g1", &["bot1", "bot2"], GroupConfig::default());
        let h = harness_with_context(MockInvoker::acknowledging(), |log| {
            let mut context = LogContext::new(log);
            context.broken.insert("bot1".to_string());
            context
        });

        let outcome = h.executor.execute(&turn_for("@all go", &group), &group).await;

        assert_eq!(h.invoker.invoked().len(), 1);
        let bot1 = outcome.result_for(&WorkerId::from("bot1")).unwrap();
        assert_eq!(bot1.status, InvocationStatus::Error);
        assert!(outcome.replied.contains("bot2"));
    }

    #[tokio::test]
    async fn test_responder_cap_limits_phase_b() {
        let config = GroupConfig::default().with_max_responders(2);
        let group = group_with("g1", &["bot1", "bot2", "bot3", "bot4"], config);
        let h = harness(MockInvoker::acknowledging());

        let outcome = h.executor.execute(&turn_for("@bot1 go", &group), &group).await;

        // One Phase A reply leaves one slot, taken in roster order
        assert_eq!(
            h.invoker.invoked(),
            vec![
                ("bot1".to_string(), InvocationKind::MustRespond),
                ("bot2".to_string(), InvocationKind::MayRespond),
            ]
        );
        assert_eq!(outcome.replied.len(), 2);
    }

    #[tokio::test]
    async fn test_phase_b_skipped_when_no_slots_left() {
        let config = GroupConfig::default().with_max_responders(1);
        let group = group_with("g1", &["bot1", "bot2"], config);
        let h = harness(MockInvoker::acknowledging());

        h.executor.execute(&turn_for("@bot1 go", &group), &group).await;

        assert_eq!(h.invoker.invoked().len(), 1);
    }

    #[tokio::test]
    async fn test_supervisor_exempt_from_cap() {
        let config = GroupConfig::default()
            .with_max_responders(1)
            .with_supervisor("lead");
        let group = group_with("g1", &["bot1", "bot2", "lead"], config);
        let h = harness(MockInvoker::acknowledging());

        let outcome = h.executor.execute(&turn_for("@bot1 go", &group), &group).await;

        let invoked: Vec<_> = h.invoker.invoked().into_iter().map(|(w, _)| w).collect();
        assert_eq!(invoked, vec!["bot1", "lead"]);
        assert!(outcome.replied.contains("lead"));
    }

    #[tokio::test]
    async fn test_next_mentions_aggregated_and_filtered() {
        let config = GroupConfig::default().with_re_invoke_already_replied(true);
        let group = group_with("g1", &["bot1", "bot2", "bot3"], config);
        let h = harness(MockInvoker::new(|input| match input.worker_id.as_str() {
            "bot1" => Script::reply("ask bot2\n<!--NEXT_MENTIONS:[\"bot2\",\"ghost\"]-->"),
            "bot2" => Script::reply("and bot3 <!--NEXT_MENTIONS:[\"bot3\"]-->"),
            _ => Script::skip(),
        }));

        let outcome = h.executor.execute(&turn_for("@bot1 @bot2 go", &group), &group).await;

        assert_eq!(
            outcome.next_mentions,
            worker_ids(&["bot2", "bot3"]).into_iter().collect()
        );
        let first = &h.log.all()[0];
        assert!(!first.content.contains("NEXT_MENTIONS"));
    }

    #[tokio::test]
    async fn test_already_replied_workers_removed_from_next_mentions() {
        let group = group_with("g1", &["bot1", "bot2"], GroupConfig::default());
        let h = harness(MockInvoker::new(|input| match input.worker_id.as_str() {
            "bot1" => Script::reply("me again <!--NEXT_MENTIONS:[\"bot1\"]-->"),
            _ => Script::skip(),
        }));

        let outcome = h.executor.execute(&turn_for("@bot1 go", &group), &group).await;

        assert!(outcome.next_mentions.is_empty());
    }

    #[tokio::test]
    async fn test_excluded_workers_not_invoked_in_phase_b() {
        let group = group_with("g1", &["bot1", "bot2", "bot3"], GroupConfig::default());
        let h = harness(MockInvoker::acknowledging());
        let turn = Turn::new(
            TurnPlan {
                must_respond: worker_ids(&["bot2"]),
                may_respond: worker_ids(&["bot1", "bot3"]),
            },
            1,
            CHAIN_TRIGGER,
            worker_ids(&["bot1"]).into_iter().collect(),
            group.config(),
        );

        h.executor.execute(&turn, &group).await;

        let invoked: Vec<_> = h.invoker.invoked().into_iter().map(|(w, _)| w).collect();
        assert_eq!(invoked, vec!["bot2", "bot3"]);
    }

    #[tokio::test]
    async fn test_memory_directives_forwarded() {
        let group = group_with("g1", &["bot1"], GroupConfig::default());
        let h = harness(MockInvoker::new(|_| {
            Script::reply(
                "Decided.\n<!--MEMORY:{\"type\":\"decision\",\"content\":\"use tokio\"}-->\n<!--PERSONAL_LOG:picked runtime-->",
            )
        }));

        h.executor.execute(&turn_for("@bot1 pick", &group), &group).await;

        let notes = h.memory.notes.lock().unwrap().clone();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, "decision");
        assert_eq!(
            h.memory.personal.lock().unwrap().clone(),
            vec![("bot1".to_string(), "picked runtime".to_string())]
        );
        assert_eq!(h.log.contents(), vec!["Decided."]);
    }

    #[tokio::test]
    async fn test_invocation_events_logged() {
        let group = group_with("g1", &["bot1", "bot2"], GroupConfig::default());
        let h = harness(MockInvoker::acknowledging());

        h.executor.execute(&turn_for("hello", &group), &group).await;

        let types = h.logger.types();
        assert_eq!(types[0], event_types::TURN_STARTED);
        assert_eq!(
            types
                .iter()
                .filter(|t| **t == event_types::WORKER_INVOCATION)
                .count(),
            2
        );
    }

    #[tokio::test]
    async fn test_no_mention_invokes_everyone_as_may_respond() {
        let group = group_with("g1", &["bot1", "bot2"], GroupConfig::default());
        let h = harness(MockInvoker::acknowledging());
        let resolution = MentionResolution::default();
        let turn = Turn::new(
            TurnPlan::initial(&resolution, &group),
            0,
            "alice",
            BTreeSet::new(),
            group.config(),
        );

        h.executor.execute(&turn, &group).await;

        assert!(
            h.invoker
                .invoked()
                .iter()
                .all(|(_, kind)| *kind == InvocationKind::MayRespond)
        );
    }
}
