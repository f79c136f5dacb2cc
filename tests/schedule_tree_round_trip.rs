mod common;

use satvis::constants::AgentId;
use satvis::intervals::window_list::WindowList;
use satvis::intervals::{Interval, IntervalCollection, PairTag};
use satvis::schedule_tree::ScheduleTree;
use satvis::vis_params::VisParams;
use satvis::zero_crossing_fit::zero_crossing_fit;

use common::linspace;

fn windows(target: u32, sensor: &str, bounds: &[(f64, f64)]) -> IntervalCollection {
    bounds
        .iter()
        .map(|&(begin, end)| Interval::new(begin, end, PairTag::new(target, sensor)).unwrap())
        .collect()
}

#[test]
fn test_extracted_windows_round_trip() {
    let times = linspace(0.0, 4.0, 5);
    let params = VisParams::default();

    let rising = zero_crossing_fit(
        &[-1.0, -0.1, 0.5, 4.0, 2.0],
        &times,
        &PairTag::new(1, "A"),
        &params,
    )
    .unwrap();
    let setting = zero_crossing_fit(
        &[1.0, 0.1, -0.5, -4.0, -2.0],
        &times,
        &PairTag::new(2, "B"),
        &params,
    )
    .unwrap();

    let rise = rising.crossing_times()[0];
    let set = setting.crossing_times()[0];

    let tree = ScheduleTree::new(rising.intervals.union(&setting.intervals));
    assert_eq!(tree.intervals().len(), 2);

    // [rise, 4) for (1, A) and [0, set) for (2, B)
    assert!(tree.is_visible(3.0, &"A".into(), &1.into()));
    assert!(!tree.is_visible(0.5 * rise, &"A".into(), &1.into()));
    assert!(tree.is_visible(0.5 * set, &"B".into(), &2.into()));
    assert!(!tree.is_visible(3.0, &"B".into(), &2.into()));
    assert!(!tree.is_visible(3.0, &"B".into(), &1.into()));

    assert_eq!(tree.visible_targets(3.0), vec![AgentId::from(1)]);
    assert_eq!(tree.visible_sensors(0.5 * set), vec![AgentId::from("B")]);

    for k in 0..tree.intervals().len() {
        let (begin, end) = (tree.start_at(k).unwrap(), tree.finish_at(k).unwrap());
        let midpoint = 0.5 * (begin + end);
        assert!(tree.is_visible(midpoint, tree.sensor_at(k).unwrap(), tree.target_at(k).unwrap()));
    }
}

#[test]
fn test_union_is_additive() {
    let first = windows(1, "A", &[(0.0, 1.0), (2.0, 3.0)]);
    let second = windows(1, "B", &[(0.5, 2.5)]);
    let third = windows(2, "A", &[(0.0, 1.0), (4.0, 6.0), (7.0, 8.0)]);

    let mut merged = first.union(&second);
    merged.merge(third.clone());
    assert_eq!(merged.len(), first.len() + second.len() + third.len());

    // identical windows of the same pair are kept twice
    let doubled = first.union(&first);
    assert_eq!(doubled.len(), 2 * first.len());
    assert_eq!(doubled.at(0.5).count(), 2);
}

#[test]
fn test_window_list_from_tree() {
    let mut collection = windows(1, "Sens A", &[(1.0, 2.0), (4.0, 7.0), (8.0, 9.0)]);
    collection.merge(windows(1, "Sens B", &[(4.0, 6.0), (8.0, 11.0)]));
    let tree = ScheduleTree::from(collection);

    let list: WindowList = tree.window_list();
    assert_eq!(list.target_ids, vec![AgentId::from(1)]);
    assert_eq!(
        list.sensor_ids,
        vec![AgentId::from("Sens A"), AgentId::from("Sens B")]
    );
    assert_eq!(
        list.windows,
        vec![
            vec![vec![(1.0, 1.0), (4.0, 3.0), (8.0, 1.0)]],
            vec![vec![(4.0, 2.0), (8.0, 3.0)]],
        ]
    );
}
