//! Metric providers and their registry.
//!
//! Every metric implements [`Metric`] and exactly one input shape, the trait deciding which values
//! the evaluation hands to it:
//!
//! | Shape                         | Receives                               |
//! |-------------------------------|----------------------------------------|
//! | [`SegmentMetric`]             | every accepted segment                 |
//! | [`TscSegmentMetric`]          | taxonomy and segment                   |
//! | [`InstanceMetric`]            | every instance                         |
//! | [`TscInstanceMetric`]         | taxonomy and instance                  |
//! | [`InstanceSegmentMetric`]     | instance and the segment it came from  |
//! | [`TscInstanceSegmentMetric`]  | taxonomy, instance and segment         |
//! | [`PostEvaluationMetric`]      | all taxonomies and the other providers |
//!
//! Optional capabilities are exposed through the `as_*` methods of [`Metric`].
use std::any::{type_name, Any};
use std::cell::{Ref, RefCell};
use std::collections::HashSet;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

use stars_core::{PredicateContext, Segment};
use stars_tsc::{Tsc, TscInstance};

use crate::error::EvaluationError;
use crate::post::{PlotSeries, SerializableResult};

pub mod providers;

/// Taxonomy evaluated against the context of a segment with ticks of type `T`.
pub type SegmentTsc<T> = Tsc<PredicateContext<T>>;

pub trait Metric {
    /// Identifier distinguishing providers of the same kind. Defaults to the type name.
    fn identifier(&self) -> String {
        short_type_name::<Self>().to_string()
    }

    fn as_stateful(&self) -> Option<&dyn Stateful> {
        None
    }

    fn as_plottable(&self) -> Option<&dyn Plottable> {
        None
    }

    fn as_serializable(&self) -> Option<&dyn Serializable> {
        None
    }
}

/// A metric with a human readable summary of its state.
pub trait Stateful {
    fn summary(&self) -> String;
}

pub trait Plottable {
    fn series(&self) -> Vec<PlotSeries>;
}

pub trait Serializable {
    fn serialize_results(&self) -> Vec<SerializableResult>;
}

pub trait SegmentMetric<T>: Metric {
    fn evaluate(&mut self, segment: &Segment<T>);
}

pub trait TscSegmentMetric<T>: Metric {
    fn evaluate(&mut self, tsc: &SegmentTsc<T>, segment: &Segment<T>);
}

pub trait InstanceMetric: Metric {
    fn evaluate(&mut self, instance: &TscInstance);
}

pub trait TscInstanceMetric<T>: Metric {
    fn evaluate(&mut self, tsc: &SegmentTsc<T>, instance: &TscInstance);
}

pub trait InstanceSegmentMetric<T>: Metric {
    fn evaluate(&mut self, instance: &TscInstance, segment: &Segment<T>);
}

pub trait TscInstanceSegmentMetric<T>: Metric {
    fn evaluate(&mut self, tsc: &SegmentTsc<T>, instance: &TscInstance, segment: &Segment<T>);
}

/// A metric derived from the other providers once all segments have been evaluated.
pub trait PostEvaluationMetric<T>: Metric {
    fn post_evaluate(&mut self, tscs: &[SegmentTsc<T>], providers: &MetricProviders<T>);
}

fn short_type_name<M: ?Sized>() -> &'static str {
    let name = type_name::<M>();
    let path = name.split('<').next().unwrap_or(name);

    path.rsplit("::").next().unwrap_or(path)
}

enum Input<T> {
    Segment(Rc<RefCell<dyn SegmentMetric<T>>>),
    TscSegment(Rc<RefCell<dyn TscSegmentMetric<T>>>),
    Instance(Rc<RefCell<dyn InstanceMetric>>),
    TscInstance(Rc<RefCell<dyn TscInstanceMetric<T>>>),
    InstanceSegment(Rc<RefCell<dyn InstanceSegmentMetric<T>>>),
    TscInstanceSegment(Rc<RefCell<dyn TscInstanceSegmentMetric<T>>>),
    PostEvaluation(Rc<RefCell<dyn PostEvaluationMetric<T>>>),
}

impl<T> Input<T> {
    fn shape(&self) -> &'static str {
        match self {
            Input::Segment(_) => "segment",
            Input::TscSegment(_) => "tsc-segment",
            Input::Instance(_) => "instance",
            Input::TscInstance(_) => "tsc-instance",
            Input::InstanceSegment(_) => "instance-segment",
            Input::TscInstanceSegment(_) => "tsc-instance-segment",
            Input::PostEvaluation(_) => "post-evaluation",
        }
    }
}

/// A registered metric together with its input shape.
///
/// The metric is shared between the input shape, its capabilities and the typed lookup of
/// [`MetricProviders::find`], so the state is never copied.
pub struct MetricProvider<T> {
    kind: &'static str,
    identifier: String,
    input: Input<T>,
    metric: Rc<RefCell<dyn Metric>>,
    any: Rc<dyn Any>,
}

macro_rules! constructor {
    ($(#[$meta:meta])* $name:ident, $shape:ident, $($bound:tt)+) => {
        $(#[$meta])*
        pub fn $name<M>(metric: M) -> Self
        where
            M: $($bound)+ + 'static,
        {
            let shared = Rc::new(RefCell::new(metric));
            let identifier = shared.borrow().identifier();

            Self {
                kind: short_type_name::<M>(),
                identifier,
                input: Input::$shape(shared.clone()),
                metric: shared.clone(),
                any: shared,
            }
        }
    };
}

impl<T: 'static> MetricProvider<T> {
    constructor!(segment, Segment, SegmentMetric<T>);
    constructor!(tsc_segment, TscSegment, TscSegmentMetric<T>);
    constructor!(instance, Instance, InstanceMetric);
    constructor!(tsc_instance, TscInstance, TscInstanceMetric<T>);
    constructor!(instance_segment, InstanceSegment, InstanceSegmentMetric<T>);
    constructor!(tsc_instance_segment, TscInstanceSegment, TscInstanceSegmentMetric<T>);
    constructor!(
        /// Post-evaluation providers run after all other providers, in registration order.
        post_evaluation,
        PostEvaluation,
        PostEvaluationMetric<T>
    );
}

impl<T> MetricProvider<T> {
    /// Type name of the metric.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn shape(&self) -> &'static str {
        self.input.shape()
    }

    /// Shared access to the metric, `None` while it is being evaluated.
    pub fn metric(&self) -> Option<Ref<'_, dyn Metric>> {
        self.metric.try_borrow().ok()
    }

    /// Typed access to the metric if it is of type `M`.
    pub fn downcast<M: 'static>(&self) -> Option<Ref<'_, M>> {
        self.any.downcast_ref::<RefCell<M>>()?.try_borrow().ok()
    }
}

impl<T> Debug for MetricProvider<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricProvider")
            .field("kind", &self.kind)
            .field("identifier", &self.identifier)
            .field("shape", &self.input.shape())
            .finish()
    }
}

/// Registered providers in registration order.
pub struct MetricProviders<T> {
    providers: Vec<MetricProvider<T>>,
    keys: HashSet<(&'static str, String)>,
}

impl<T> Default for MetricProviders<T> {
    fn default() -> Self {
        Self {
            providers: Vec::new(),
            keys: HashSet::new(),
        }
    }
}

impl<T> Debug for MetricProviders<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(&self.providers).finish()
    }
}

impl<T> MetricProviders<T> {
    /// Register a provider. Fails if a provider of the same kind and identifier is registered.
    pub fn register(&mut self, provider: MetricProvider<T>) -> Result<(), EvaluationError> {
        let key = (provider.kind, provider.identifier.clone());

        if !self.keys.insert(key) {
            return Err(EvaluationError::DuplicateProvider {
                kind: provider.kind,
                identifier: provider.identifier,
            });
        }

        self.providers.push(provider);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MetricProvider<T>> {
        self.providers.iter()
    }

    /// The first registered metric of type `M`.
    pub fn find<M: 'static>(&self) -> Option<Ref<'_, M>> {
        self.providers.iter().find_map(|provider| provider.downcast::<M>())
    }

    /// The metric of type `M` registered under `identifier`.
    pub fn find_by_identifier<M: 'static>(&self, identifier: &str) -> Option<Ref<'_, M>> {
        self.providers
            .iter()
            .filter(|provider| provider.identifier == identifier)
            .find_map(|provider| provider.downcast::<M>())
    }

    pub(crate) fn evaluate_segment(&self, segment: &Segment<T>) {
        for provider in &self.providers {
            if let Input::Segment(metric) = &provider.input {
                metric.borrow_mut().evaluate(segment);
            }
        }
    }

    pub(crate) fn evaluate_tsc_segment(&self, tsc: &SegmentTsc<T>, segment: &Segment<T>) {
        for provider in &self.providers {
            if let Input::TscSegment(metric) = &provider.input {
                metric.borrow_mut().evaluate(tsc, segment);
            }
        }
    }

    pub(crate) fn evaluate_instance(&self, tsc: &SegmentTsc<T>, instance: &TscInstance, segment: &Segment<T>) {
        for provider in &self.providers {
            match &provider.input {
                Input::Instance(metric) => metric.borrow_mut().evaluate(instance),
                Input::TscInstance(metric) => metric.borrow_mut().evaluate(tsc, instance),
                Input::InstanceSegment(metric) => metric.borrow_mut().evaluate(instance, segment),
                Input::TscInstanceSegment(metric) => metric.borrow_mut().evaluate(tsc, instance, segment),
                _ => {}
            }
        }
    }

    pub(crate) fn post_evaluate(&self, tscs: &[SegmentTsc<T>]) {
        for provider in &self.providers {
            if let Input::PostEvaluation(metric) = &provider.input {
                metric.borrow_mut().post_evaluate(tscs, self);
            }
        }
    }
}

impl<'a, T> IntoIterator for &'a MetricProviders<T> {
    type Item = &'a MetricProvider<T>;
    type IntoIter = std::slice::Iter<'a, MetricProvider<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.providers.iter()
    }
}
