//! Evaluation pipeline: context event in, applied plan and history out
//!
//! One cycle runs: scene build, rule matching, target resolution and
//! conflict-resolved planning, idempotent dispatch, history recording.
//! Matching and planning are pure; dispatch and history are the only
//! stages with externally visible effects.

use crate::cycle::{CycleGate, CycleToken};
use crate::dispatcher::ActionDispatcher;
use crate::error::EngineResult;
use crate::history::HistoryRecorder;
use crate::matcher::match_rules;
use crate::planner::build_plan;
use crate::scene::build_scene;
use crate::traits::{ExtensionHost, HistoryStore, RuleStore};
use crate::types::{
    DispatchOutcome, DispatchReport, EvaluationResult, PlannedAction, Scene, TabContext,
};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Notification emitted when an evaluation cycle completes
#[derive(Debug, Clone)]
pub struct CycleNotice {
    pub cycle_id: Uuid,
    pub scene: Scene,
    /// The plan entries that were actually applied this cycle
    pub applied: Vec<PlannedAction>,
}

/// The rule matching and group activation engine.
///
/// Collaborators are injected so the engine runs identically against a live
/// browser or in-memory fakes. Rule and group collections are read once per
/// cycle; external mutations become visible on the next triggered cycle.
pub struct RuleEngine {
    rules: Arc<dyn RuleStore>,
    dispatcher: ActionDispatcher,
    recorder: HistoryRecorder,
    gate: CycleGate,
    ambient_scene: RwLock<Option<String>>,
    last_context: RwLock<Option<TabContext>>,
    completed: broadcast::Sender<CycleNotice>,
}

impl RuleEngine {
    pub fn new(
        host: Arc<dyn ExtensionHost>,
        rules: Arc<dyn RuleStore>,
        history: Arc<dyn HistoryStore>,
    ) -> Self {
        let (completed, _) = broadcast::channel(16);
        Self {
            rules,
            dispatcher: ActionDispatcher::new(host),
            recorder: HistoryRecorder::new(history),
            gate: CycleGate::new(),
            ambient_scene: RwLock::new(None),
            last_context: RwLock::new(None),
            completed,
        }
    }

    /// Subscribe to cycle-completed notifications
    pub fn subscribe(&self) -> broadcast::Receiver<CycleNotice> {
        self.completed.subscribe()
    }

    /// Currently selected scene-mode id, if any
    pub async fn scene_mode(&self) -> Option<String> {
        self.ambient_scene.read().await.clone()
    }

    /// Select the ambient scene mode and re-evaluate the most recent tab
    /// context under it. Returns `None` when no context has been seen yet.
    pub async fn set_scene_mode(
        &self,
        scene_id: Option<String>,
    ) -> EngineResult<Option<EvaluationResult>> {
        *self.ambient_scene.write().await = scene_id;
        let context = self.last_context.read().await.clone();
        match context {
            Some(context) => self.submit(context).await.map(Some),
            None => Ok(None),
        }
    }

    /// Handle one tab-context-change event.
    ///
    /// Last event wins: submitting preempts any cycle still in flight, whose
    /// not-yet-issued dispatch work is dropped. Calls that already reached
    /// the host are not rolled back.
    pub async fn submit(&self, context: TabContext) -> EngineResult<EvaluationResult> {
        *self.last_context.write().await = Some(context.clone());
        let scene_id = self.ambient_scene.read().await.clone();
        let scene = build_scene(&context, scene_id);
        let token = self.gate.open();
        self.run_cycle(scene, token).await
    }

    /// Manual/test entry point: evaluate one prepared scene through the
    /// full pipeline. Preempts in-flight cycles like `submit`.
    pub async fn evaluate(&self, scene: Scene) -> EngineResult<EvaluationResult> {
        let token = self.gate.open();
        self.run_cycle(scene, token).await
    }

    async fn run_cycle(&self, scene: Scene, token: CycleToken) -> EngineResult<EvaluationResult> {
        let cycle_id = Uuid::new_v4();
        debug!(
            %cycle_id,
            host = scene.host.as_deref().unwrap_or("-"),
            "Evaluation cycle started"
        );

        // Snapshot the rule collection once for this cycle
        let rules = self.rules.list_rules().await?;
        let matched = match_rules(&scene, &rules);
        let matched_rule_ids: Vec<String> = matched.iter().map(|r| r.id.clone()).collect();

        // A configuration-shape error aborts here, before any state change
        let outcome = build_plan(&matched, self.rules.as_ref()).await?;
        for err in &outcome.skipped {
            warn!(%cycle_id, "{err}");
        }

        if !token.is_live() {
            debug!(%cycle_id, "Cycle preempted before dispatch, dropping plan");
            return Ok(EvaluationResult {
                cycle_id,
                scene,
                matched_rule_ids,
                plan: outcome.plan,
                report: DispatchReport::default(),
                history_written: 0,
            });
        }

        let report = self.dispatcher.dispatch(&outcome.plan, &token).await;
        let history_written = self.recorder.record_cycle(&report).await;

        let applied: Vec<PlannedAction> = report
            .actions
            .iter()
            .filter(|a| a.outcome == DispatchOutcome::Applied)
            .map(|a| a.planned.clone())
            .collect();

        info!(
            %cycle_id,
            matched = matched_rule_ids.len(),
            planned = outcome.plan.len(),
            applied = applied.len(),
            history_written,
            "Evaluation cycle completed"
        );

        let _ = self.completed.send(CycleNotice {
            cycle_id,
            scene: scene.clone(),
            applied,
        });

        Ok(EvaluationResult {
            cycle_id,
            scene,
            matched_rule_ids,
            plan: outcome.plan,
            report,
            history_written,
        })
    }
}
