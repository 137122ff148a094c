//! Outdated decision
//!
//! Decides whether a fact box disagrees with a fresh assessment.

use crate::assessment::Assessment;
use crate::fact_box::FactBox;
use tracing::trace;

/// True iff the fact box must be rewritten for `assessment`
///
/// Extinct fact boxes (including the informal "fossil" spellings) are
/// never outdated, whatever the assessment says. Otherwise the fact box is
/// outdated when the id differs, the stored status is missing or not a
/// synonym of the assessed status, or the years differ (both absent is
/// equal). Fields other than these three are ignored.
pub fn is_outdated(view: &FactBox, assessment: &Assessment) -> bool {
    if view.is_extinct() {
        trace!(status = ?view.status_text(), "Extinct fact box is never outdated");
        return false;
    }

    let id_differs = view.red_list_id() != Some(assessment.subject_id);
    let status_differs = !view
        .status_text()
        .is_some_and(|text| assessment.status.matches(text));
    let year_differs = view.year_assessed() != assessment.year_assessed;

    trace!(
        id_differs,
        status_differs,
        year_differs,
        "Compared fact box with assessment"
    );

    id_differs || status_differs || year_differs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::StatusCode;

    fn fact_box(fields: &[(&str, &str)]) -> FactBox {
        FactBox::new(&fields.iter().copied().collect())
    }

    fn assessment(id: u64, status: StatusCode, year: Option<i32>) -> Assessment {
        Assessment::new(id, status, year)
    }

    #[test]
    fn test_outdated() {
        let cases = [
            (fact_box(&[]), assessment(1, StatusCode::VU, None)),
            (fact_box(&[]), assessment(1, StatusCode::VU, Some(2022))),
            (fact_box(&[("rl-id", "1")]), assessment(1, StatusCode::VU, None)),
            (fact_box(&[("rl-id", "1")]), assessment(1, StatusCode::VU, Some(2022))),
            (
                fact_box(&[("rl-id", "1"), ("statusbron", "2022")]),
                assessment(1, StatusCode::VU, None),
            ),
            (
                fact_box(&[("rl-id", "2"), ("status", "VU")]),
                assessment(1, StatusCode::VU, None),
            ),
            (
                fact_box(&[("rl-id", "1"), ("status", "VU")]),
                assessment(1, StatusCode::VU, Some(2022)),
            ),
            (
                fact_box(&[("rl-id", "1"), ("status", "VU"), ("statusbron", "2022")]),
                assessment(1, StatusCode::VU, None),
            ),
            (
                fact_box(&[("rl-id", "1"), ("status", "VU"), ("statusbron", "2021")]),
                assessment(1, StatusCode::VU, Some(2022)),
            ),
            (
                fact_box(&[("rl-id", "1"), ("status", "bedreigd")]),
                assessment(1, StatusCode::VU, None),
            ),
        ];

        for (view, assessment) in &cases {
            assert!(is_outdated(view, assessment), "{:?} vs {:?}", view, assessment);
        }
    }

    #[test]
    fn test_not_outdated() {
        let cases = [
            (
                fact_box(&[("rl-id", "1"), ("status", "VU")]),
                assessment(1, StatusCode::VU, None),
            ),
            (
                fact_box(&[("rl-id", "1"), ("status", "kwetsbaar")]),
                assessment(1, StatusCode::VU, None),
            ),
            (
                fact_box(&[("rl-id", "1"), ("status", "KWETSBAAR")]),
                assessment(1, StatusCode::VU, None),
            ),
            (
                fact_box(&[("rl-id", "1"), ("status", "VU"), ("statusbron", "2022")]),
                assessment(1, StatusCode::VU, Some(2022)),
            ),
            (
                fact_box(&[("rl-id", "1"), ("status", "LR/nt")]),
                assessment(1, StatusCode::NT, None),
            ),
            (
                fact_box(&[("rl-id", "1"), ("status", "vanbeschermingafhankelijk")]),
                assessment(1, StatusCode::CD, None),
            ),
        ];

        for (view, assessment) in &cases {
            assert!(!is_outdated(view, assessment), "{:?} vs {:?}", view, assessment);
        }
    }

    #[test]
    fn test_extinct_never_outdated() {
        for status in ["EX", "Extinct", "Fossiel", "fossiel", "fossil", "Fossil", "FOSSIEL"] {
            let view = fact_box(&[("rl-id", "1"), ("status", status)]);
            assert!(!is_outdated(&view, &assessment(0, StatusCode::VU, None)), "{status}");
            assert!(
                !is_outdated(&view, &assessment(99, StatusCode::LC, Some(2023))),
                "{status}"
            );
        }
    }

    #[test]
    fn test_extinct_in_the_wild_not_guarded() {
        let view = fact_box(&[("rl-id", "1"), ("status", "EW")]);
        assert!(is_outdated(&view, &assessment(1, StatusCode::CR, None)));
    }

    #[test]
    fn test_empty_year_equals_absent_year() {
        let view = fact_box(&[("rl-id", "1"), ("status", "VU"), ("statusbron", "")]);
        assert!(!is_outdated(&view, &assessment(1, StatusCode::VU, None)));
    }

    #[test]
    fn test_unrelated_field_ignored() {
        let base = [("rl-id", "1"), ("status", "VU"), ("statusbron", "2022")];
        let mut extended = base.to_vec();
        extended.push(("soort", "dier"));

        for a in [
            assessment(1, StatusCode::VU, Some(2022)),
            assessment(2, StatusCode::VU, Some(2022)),
        ] {
            assert_eq!(
                is_outdated(&fact_box(&base), &a),
                is_outdated(&fact_box(&extended), &a)
            );
        }
    }
}
