//! The evaluation loop.
//!
//! A [`TscEvaluation`] consumes a sequence of segments once. For every segment accepted by the
//! pre-segment hooks, the segment providers are evaluated, then every taxonomy accepted by the
//! pre-taxonomy hooks is evaluated against the segment context before the next segment is pulled.
//! After the last segment the post-evaluation steps run in a fixed order:
//!
//!   1. summaries of stateful providers are logged,
//!   2. post-evaluation providers run in registration order,
//!   3. plottable providers are handed to the plot sink,
//!   4. serializable results are handed to the result store,
//!   5. serializable results are compared with the previous run.
use std::sync::Arc;

use stars_core::{PredicateContext, Segment};
use tracing::{debug, info, info_span, warn};

use crate::config::EvaluationConfig;
use crate::error::{EvaluationError, ExportError};
use crate::hooks::{apply_hooks, EvaluationHook, EvaluationHookResult, HookResults};
use crate::metrics::{MetricProvider, MetricProviders, SegmentTsc};
use crate::post::{compare_results, ComparisonVerdict, PlotSink, ResultStore, SerializableResult};
use crate::progress::{EvaluationProgress, ProgressReporter};

/// Totals of a finished evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationSummary {
    /// Segments handed to the metric providers
    pub segments: usize,
    /// Segments left out by a pre-segment hook
    pub skipped_segments: usize,
    pub instances: usize,
    /// Identifiers of the taxonomies accepted by the pre-taxonomy hooks
    pub taxonomies: Vec<String>,
    /// Whether a hook cancelled the evaluation of the remaining taxonomies or segments
    pub cancelled: bool,
    pub verdict: ComparisonVerdict,
}

pub struct TscEvaluation<T> {
    tscs: Vec<SegmentTsc<T>>,
    providers: MetricProviders<T>,
    pre_tsc_hooks: Vec<EvaluationHook<SegmentTsc<T>>>,
    pre_segment_hooks: Vec<EvaluationHook<Segment<T>>>,
    tsc_hook_results: HookResults,
    segment_hook_results: HookResults,
    config: EvaluationConfig,
    plot_sink: Option<Box<dyn PlotSink>>,
    result_store: Option<Box<dyn ResultStore>>,
    progress: Arc<EvaluationProgress>,
}

impl<T: 'static> TscEvaluation<T> {
    pub fn new(tscs: impl IntoIterator<Item = SegmentTsc<T>>, config: EvaluationConfig) -> Self {
        Self {
            tscs: tscs.into_iter().collect(),
            providers: MetricProviders::default(),
            pre_tsc_hooks: Vec::new(),
            pre_segment_hooks: Vec::new(),
            tsc_hook_results: HookResults::new(),
            segment_hook_results: HookResults::new(),
            config,
            plot_sink: None,
            result_store: None,
            progress: Arc::new(EvaluationProgress::default()),
        }
    }

    pub fn register(&mut self, provider: MetricProvider<T>) -> Result<(), EvaluationError> {
        debug!(kind = provider.kind(), identifier = provider.identifier(), shape = provider.shape(), "Registering provider");
        self.providers.register(provider)
    }

    pub fn register_all<I>(&mut self, providers: I) -> Result<(), EvaluationError>
    where
        I: IntoIterator<Item = MetricProvider<T>>,
    {
        providers.into_iter().try_for_each(|provider| self.register(provider))
    }

    pub fn add_pre_tsc_hook(&mut self, hook: EvaluationHook<SegmentTsc<T>>) {
        self.pre_tsc_hooks.push(hook);
    }

    pub fn add_pre_segment_hook(&mut self, hook: EvaluationHook<Segment<T>>) {
        self.pre_segment_hooks.push(hook);
    }

    pub fn with_plot_sink(mut self, sink: impl PlotSink + 'static) -> Self {
        self.plot_sink = Some(Box::new(sink));
        self
    }

    pub fn with_result_store(mut self, store: impl ResultStore + 'static) -> Self {
        self.result_store = Some(Box::new(store));
        self
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    pub fn tscs(&self) -> &[SegmentTsc<T>] {
        &self.tscs
    }

    pub fn providers(&self) -> &MetricProviders<T> {
        &self.providers
    }

    /// Results of the pre-taxonomy hooks, keyed by taxonomy identifier.
    pub fn tsc_hook_results(&self) -> &HookResults {
        &self.tsc_hook_results
    }

    /// Results of the pre-segment hooks, keyed by segment identifier.
    pub fn segment_hook_results(&self) -> &HookResults {
        &self.segment_hook_results
    }

    /// Counters of the running evaluation, shared with the progress reporter.
    pub fn progress(&self) -> Arc<EvaluationProgress> {
        Arc::clone(&self.progress)
    }

    pub fn result_store(&self) -> Option<&dyn ResultStore> {
        self.result_store.as_deref()
    }

    /// Evaluate every segment of the sequence and run the post-evaluation steps.
    pub fn run<I>(&mut self, segments: I) -> Result<EvaluationSummary, EvaluationError>
    where
        I: IntoIterator<Item = Segment<T>>,
    {
        if self.providers.is_empty() {
            return Err(EvaluationError::NoProviders);
        }

        let span = info_span!("evaluation", tscs = self.tscs.len(), providers = self.providers.len());
        let _guard = span.enter();

        let (accepted, mut cancelled) = self.accepted_tscs()?;
        info!(accepted = accepted.len(), "Starting evaluation");

        let reporter = match self.config.progress_interval() {
            Some(interval) => Some(ProgressReporter::start(self.progress(), interval)?),
            None => None,
        };

        if !cancelled || !accepted.is_empty() {
            cancelled |= self.evaluate_segments(&accepted, segments)?;
        }

        if let Some(reporter) = reporter {
            reporter.stop();
        }

        info!(
            segments = self.progress.segments(),
            instances = self.progress.instances(),
            "Evaluated all segments"
        );

        let verdict = self.post_evaluate()?;

        Ok(EvaluationSummary {
            segments: self.progress.segments(),
            skipped_segments: self.progress.skipped_segments(),
            instances: self.progress.instances(),
            taxonomies: accepted.iter().map(|&index| self.tscs[index].identifier().to_string()).collect(),
            cancelled,
            verdict,
        })
    }

    /// Indices of the taxonomies accepted by the pre-taxonomy hooks, and whether a hook cancelled.
    ///
    /// A cancel drops the remaining taxonomies. The ones accepted before it are still evaluated.
    fn accepted_tscs(&mut self) -> Result<(Vec<usize>, bool), EvaluationError> {
        let mut accepted = Vec::new();

        for (index, tsc) in self.tscs.iter().enumerate() {
            match apply_hooks(&self.pre_tsc_hooks, tsc.identifier(), tsc, &mut self.tsc_hook_results)? {
                EvaluationHookResult::Ok => accepted.push(index),
                EvaluationHookResult::Skip => {}
                EvaluationHookResult::Cancel | EvaluationHookResult::Abort => return Ok((accepted, true)),
            }
        }

        Ok((accepted, false))
    }

    /// Returns whether a pre-segment hook cancelled the remaining segments.
    fn evaluate_segments<I>(&mut self, accepted: &[usize], segments: I) -> Result<bool, EvaluationError>
    where
        I: IntoIterator<Item = Segment<T>>,
    {
        for segment in segments {
            match apply_hooks(
                &self.pre_segment_hooks,
                segment.identifier(),
                &segment,
                &mut self.segment_hook_results,
            )? {
                EvaluationHookResult::Ok => {}
                EvaluationHookResult::Skip => {
                    self.progress.record_skipped_segment();
                    continue;
                }
                EvaluationHookResult::Cancel | EvaluationHookResult::Abort => return Ok(true),
            }

            self.progress.record_segment();
            self.providers.evaluate_segment(&segment);

            let Some(context) = segment.context() else {
                warn!(segment = segment.identifier(), "Segment has no ticks, skipping taxonomies");
                continue;
            };

            for &index in accepted {
                self.evaluate_tsc(&self.tscs[index], &segment, &context);
            }
        }

        Ok(false)
    }

    fn evaluate_tsc(&self, tsc: &SegmentTsc<T>, segment: &Segment<T>, context: &PredicateContext<T>) {
        self.providers.evaluate_tsc_segment(tsc, segment);

        let instance = tsc.evaluate(context, segment.identifier());
        self.progress.record_instance();

        self.providers.evaluate_instance(tsc, &instance, segment);
    }

    fn post_evaluate(&mut self) -> Result<ComparisonVerdict, EvaluationError> {
        self.print_summaries();
        self.providers.post_evaluate(&self.tscs);

        if self.config.write_plots {
            self.export_plots()?;
        }

        let results = self.serialized_results();

        if self.config.write_serialized_results {
            if let Some(store) = self.result_store.as_mut() {
                store.save(&results).map_err(|source| export("save results", source))?;
                info!(results = results.len(), "Saved serialized results");
            }
        }

        if !self.config.compare_to_previous_run {
            return Ok(ComparisonVerdict::Unknown);
        }

        let Some(store) = self.result_store.as_ref() else {
            return Ok(ComparisonVerdict::Unknown);
        };

        let previous = store.load_previous().map_err(|source| export("load previous results", source))?;
        let verdict = compare_results(&results, previous.as_deref());

        match verdict {
            ComparisonVerdict::Fail => warn!(%verdict, "Results differ from the previous run"),
            _ => info!(%verdict, "Compared results with the previous run"),
        }

        Ok(verdict)
    }

    fn print_summaries(&self) {
        for provider in &self.providers {
            let Some(metric) = provider.metric() else { continue };

            if let Some(stateful) = metric.as_stateful() {
                info!(provider = provider.identifier(), "{}", stateful.summary());
            }
        }
    }

    fn export_plots(&mut self) -> Result<(), EvaluationError> {
        let Some(sink) = self.plot_sink.as_mut() else {
            return Ok(());
        };

        for provider in &self.providers {
            let Some(metric) = provider.metric() else { continue };
            let Some(plottable) = metric.as_plottable() else { continue };
            let series = plottable.series();

            sink.plot(provider.identifier(), &series)
                .map_err(|source| export("plot", source))?;

            if self.config.write_plot_data_csv {
                sink.write_csv(provider.identifier(), &series)
                    .map_err(|source| export("write plot data", source))?;
            }
        }

        Ok(())
    }

    fn serialized_results(&self) -> Vec<SerializableResult> {
        self.providers
            .iter()
            .filter_map(|provider| provider.metric())
            .flat_map(|metric| metric.as_serializable().map(|serializable| serializable.serialize_results()))
            .flatten()
            .collect()
    }
}

fn export(step: &'static str, source: ExportError) -> EvaluationError {
    EvaluationError::Export { step, source }
}
