use std::io::Cursor;

use super::*;
use crate::tracking::report::FloatField;
use crate::tracking::wire::encode_line;

#[test]
fn replay_yields_reports_nulls_and_then_ends() {
    let report = TrackingReport::neutral().with_float(FloatField::Blink, 0.5);
    let input = format!(
        "{}\n\n\"calibrate\"\n{}\n",
        encode_line(None),
        encode_line(Some(&report))
    );
    let mut tracker = ReplayTracker::new(Cursor::new(input));

    assert_eq!(tracker.next_report().unwrap(), None);
    assert_eq!(tracker.next_report().unwrap(), Some(report));
    assert!(matches!(
        tracker.next_report().unwrap_err(),
        LayertuberError::Tracker(_)
    ));
}

#[test]
fn replay_reports_bad_lines_with_line_numbers() {
    let mut tracker = ReplayTracker::new(Cursor::new("null\n{\"blink\": 1}\n"));
    assert_eq!(tracker.next_report().unwrap(), None);
    let err = tracker.next_report().unwrap_err();
    assert!(err.to_string().contains("line 2"), "{err}");
}

#[test]
fn scripted_tracker_plays_in_order() {
    let a = TrackingReport::neutral().with_float(FloatField::MouthOpen, 1.0);
    let mut tracker: Box<dyn Tracker> =
        Box::new(ScriptedTracker::new([None, Some(a.clone())]));
    assert_eq!(tracker.next_report().unwrap(), None);
    assert_eq!(tracker.next_report().unwrap(), Some(a));
    assert!(tracker.next_report().is_err());
}
