use std::error::Error;

use approx::assert_relative_eq;

use stars::eval::providers::{
    FailedMonitors, MissedTscInstancesPerTsc, SegmentCount, TotalSegmentTickDifference, ValidTscInstancesPerTsc,
};
use stars::eval::{EvaluationConfig, EvaluationHook, EvaluationHookResult, MetricProvider, SegmentTsc, TscEvaluation};
use stars::operators::{eventually, globally};
use stars::tsc::builder::{all, exclusive, leaf, optional, TscBuilder};
use stars::{
    BinaryPredicate, EntityData, EntityId, Interval, IterationMode, IterationOrder, PredicateContext, Segment,
    TickData, TickRef, TickWindow, Trace, UnaryPredicate,
};

const EGO: EntityId = 1;
const LEAD: EntityId = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Car,
    Pedestrian,
}

#[derive(Debug, Clone)]
struct Actor {
    id: EntityId,
    kind: Kind,
    position: f64,
    speed: f64,
}

impl EntityData for Actor {
    type Kind = Kind;

    fn id(&self) -> EntityId {
        self.id
    }

    fn kind(&self) -> Kind {
        self.kind
    }
}

#[derive(Debug, Clone)]
struct Tick {
    time: f64,
    actors: Vec<Actor>,
}

impl TickData for Tick {
    type Entity = Actor;

    fn tick_time(&self) -> f64 {
        self.time
    }

    fn entities(&self) -> &[Actor] {
        &self.actors
    }
}

type Context = PredicateContext<Tick>;

const EGO_SPEEDS: [f64; 12] = [20.0, 20.0, 21.0, 20.0, 25.0, 35.0, 28.0, 26.0, 30.0, 45.0, 30.0, 29.0];
const LEAD_GAPS: [f64; 12] = [30.0, 30.0, 30.0, 30.0, 100.0, 100.0, 100.0, 100.0, 30.0, 30.0, 30.0, 30.0];

fn recording() -> Vec<Tick> {
    EGO_SPEEDS
        .iter()
        .zip(LEAD_GAPS)
        .enumerate()
        .map(|(index, (&speed, gap))| {
            let position = index as f64 * 10.0;

            Tick {
                time: index as f64,
                actors: vec![
                    Actor { id: EGO, kind: Kind::Car, position, speed },
                    Actor { id: LEAD, kind: Kind::Car, position: position + gap, speed: 20.0 },
                    Actor { id: 3, kind: Kind::Pedestrian, position: 0.0, speed: 1.0 },
                ],
            }
        })
        .collect()
}

fn speeding_at(tick: TickRef<'_, Tick>) -> bool {
    UnaryPredicate::<Tick, _>::new(Kind::Car, |_, car: &Actor| car.speed > 30.0).holds(tick, EGO)
}

fn close_behind(tick: TickRef<'_, Tick>) -> bool {
    BinaryPredicate::<Tick, _>::new(Kind::Car, Kind::Car, |_, ego: &Actor, lead: &Actor| {
        (0.0..50.0).contains(&(lead.position - ego.position))
    })
    .holds(tick, EGO, LEAD)
}

fn following(context: &Context) -> bool {
    globally(context.first_tick(), None, close_behind)
}

fn speeding(context: &Context) -> bool {
    eventually(context.first_tick(), None, speeding_at)
}

fn never_above_40(context: &Context) -> bool {
    globally(context.first_tick(), None, |tick| {
        tick.entity(EGO).map_or(true, |ego| ego.speed <= 40.0)
    })
}

fn highway() -> Result<SegmentTsc<Tick>, stars::tsc::TscError> {
    TscBuilder::new("highway")
        .root(
            all("root")
                .child(
                    exclusive("maneuver")
                        .child(leaf("following").condition(following))
                        .child(leaf("free driving").condition(|context: &Context| !following(context))),
                )
                .child(
                    optional("speed").child(
                        leaf("speeding")
                            .condition(speeding)
                            .monitor("never above 40", never_above_40),
                    ),
                ),
        )
        .build()
}

fn segments() -> Result<Vec<Segment<Tick>>, Box<dyn Error>> {
    let ticks = recording();
    let mut segments: Vec<Segment<Tick>> = ticks
        .chunks(4)
        .enumerate()
        .map(|(index, chunk)| Segment::from_ticks(format!("segment-{index}"), EGO, chunk.to_vec()))
        .collect();

    let single = Trace::from_ticks(ticks.into_iter().take(1))?;
    segments.push(Segment::new("single-tick", EGO, single));

    Ok(segments)
}

#[test]
fn sliding_window_over_recording() -> Result<(), Box<dyn Error>> {
    let trace = Trace::from_ticks(recording())?;
    let mut window = TickWindow::new(3, IterationOrder::Forward, IterationMode::FullFrame, trace.into_states())?;
    let interval = Some(Interval::new(0, 3)?);

    let speeding_soon: Vec<bool> = window
        .frames()?
        .map(|frame| eventually(frame.anchor(), interval, speeding_at))
        .collect();

    assert_eq!(
        speeding_soon,
        vec![false, false, false, true, true, true, false, true, true, true]
    );

    Ok(())
}

#[test]
fn highway_coverage() -> Result<(), Box<dyn Error>> {
    let mut evaluation = TscEvaluation::new([highway()?], EvaluationConfig::silent());

    evaluation.register_all([
        MetricProvider::segment(SegmentCount::default()),
        MetricProvider::segment(TotalSegmentTickDifference::default()),
        MetricProvider::tsc_instance(ValidTscInstancesPerTsc::default()),
        MetricProvider::post_evaluation(MissedTscInstancesPerTsc::default()),
        MetricProvider::instance(FailedMonitors::default()),
    ])?;

    evaluation.add_pre_segment_hook(EvaluationHook::new("at least two ticks", |segment: &Segment<Tick>| {
        if segment.len() < 2 {
            EvaluationHookResult::Skip
        } else {
            EvaluationHookResult::Ok
        }
    }));

    let summary = evaluation.run(segments()?)?;

    assert_eq!(summary.segments, 3);
    assert_eq!(summary.skipped_segments, 1);
    assert_eq!(summary.instances, 3);

    let providers = evaluation.providers();
    let valid = providers.find::<ValidTscInstancesPerTsc>().ok_or("missing provider")?;
    let mut observed: Vec<Vec<&str>> = valid
        .instances("highway")
        .ok_or("no instances")?
        .keys()
        .map(|instance| instance.leaf_labels())
        .collect();
    observed.sort();

    assert_eq!(
        observed,
        vec![vec!["following"], vec!["following", "speeding"], vec!["free driving", "speeding"]]
    );

    let missed = providers.find::<MissedTscInstancesPerTsc>().ok_or("missing provider")?;
    let coverage = missed.missed("highway").ok_or("no coverage")?;
    assert_eq!(coverage.possible, stars::BigUint::from(4u32));
    assert_eq!(coverage.missed, stars::BigUint::from(1u32));

    let monitors = providers.find::<FailedMonitors>().ok_or("missing provider")?;
    let failed = monitors.failed("highway");
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].segment_identifier, "segment-2");

    let difference = providers.find::<TotalSegmentTickDifference>().ok_or("missing provider")?;
    assert_relative_eq!(difference.total(), 9.0);

    Ok(())
}

#[test]
fn projections_classify_one_concern() -> Result<(), Box<dyn Error>> {
    let tsc: SegmentTsc<Tick> = TscBuilder::new("highway")
        .root(
            all("root")
                .child(
                    exclusive("maneuver")
                        .projection_recursive("behaviour")
                        .child(leaf("following").condition(following))
                        .child(leaf("free driving").condition(|context: &Context| !following(context))),
                )
                .child(optional("speed").child(leaf("speeding").condition(speeding))),
        )
        .build()?;

    let projections = tsc.build_projections(&[]);
    assert_eq!(projections.len(), 1);

    let behaviour = &projections[0].tsc;
    let segments = segments()?;
    let context = segments[1].context().ok_or("empty segment")?;

    assert_eq!(behaviour.evaluate(&context, segments[1].identifier()).leaf_labels(), vec!["free driving"]);
    assert_eq!(behaviour.instance_count(), stars::BigUint::from(2u32));

    Ok(())
}
