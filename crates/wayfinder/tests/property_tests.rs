//! Property-based tests for chain resolution.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use proptest::prelude::*;
use wayfinder::mock::RecordingSession;
use wayfinder::prelude::*;

/// Linear chain `S0 <- S1 <- ... <- S{n-1}`; step `Si` shows page `pi`
fn linear_chain(n: usize) -> Navigator<RecordingSession> {
    let navigator = Navigator::new(NavigatorConfig::immediate());
    for i in 0..n {
        let page = format!("p{i}");
        let expected = page.clone();
        let mut step = StepDef::new(
            ViewDescriptor::new(page.clone(), move |s: &RecordingSession, _: &dyn Subject| {
                s.page() == expected
            })
            .shared(),
        )
        .with_action(move |s: &mut RecordingSession, _| {
            s.visit(page.clone());
            Ok(())
        });
        if i > 0 {
            step = step.with_prerequisite(Prerequisite::sibling(format!("S{}", i - 1)));
        }
        navigator
            .registry()
            .register::<Application, _>(format!("S{i}"), step)
            .unwrap();
    }
    navigator.registry().seal();
    navigator
}

fn app() -> SubjectRef {
    Application::shared("app")
}

/// Chain length and the index of the displayed step, if any
fn chain_and_position() -> impl Strategy<Value = (usize, Option<usize>)> {
    (1usize..8).prop_flat_map(|n| (Just(n), proptest::option::of(0..n)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_only_steps_after_displayed_one_run((n, displayed) in chain_and_position()) {
        let navigator = linear_chain(n);
        let start = displayed.map_or_else(|| "nowhere".to_string(), |k| format!("p{k}"));
        let mut session = RecordingSession::new(start);

        let navigation = navigator
            .navigate(&mut session, &app(), &format!("S{}", n - 1), NavigateOptions::default())
            .unwrap();

        let first = displayed.map_or(0, |k| k + 1);
        let expected: Vec<String> = (first..n).map(|i| format!("p{i}")).collect();
        let expected: Vec<&str> = expected.iter().map(String::as_str).collect();
        prop_assert_eq!(session.visits(), expected);
        prop_assert_eq!(navigation.go_count() as usize, n - first);
        prop_assert_eq!(session.refresh_count(), 0);
    }

    #[test]
    fn prop_navigation_is_idempotent((n, displayed) in chain_and_position()) {
        let navigator = linear_chain(n);
        let start = displayed.map_or_else(|| "nowhere".to_string(), |k| format!("p{k}"));
        let mut session = RecordingSession::new(start);
        let target = format!("S{}", n - 1);

        navigator.navigate_to(&mut session, &app(), &target).unwrap();
        session.clear();
        let again = navigator
            .navigate(&mut session, &app(), &target, NavigateOptions::default())
            .unwrap();

        prop_assert_eq!(again.go_count(), 0);
        prop_assert!(session.actions().is_empty());
    }

    #[test]
    fn prop_plan_matches_execution((n, displayed) in chain_and_position()) {
        let navigator = linear_chain(n);
        let start = displayed.map_or_else(|| "nowhere".to_string(), |k| format!("p{k}"));
        let target = format!("S{}", n - 1);

        let plan = navigator.plan(&RecordingSession::new(start.clone()), &app(), &target).unwrap();
        let mut session = RecordingSession::new(start);
        let navigation = navigator
            .navigate(&mut session, &app(), &target, NavigateOptions::default())
            .unwrap();

        let executed: Vec<String> = navigation.executed.iter().map(|r| r.step.clone()).collect();
        let planned: Vec<String> = plan.steps.iter().map(|p| p.key.to_string()).collect();
        prop_assert_eq!(executed, planned);
        prop_assert_eq!(plan.anchor.is_some(), displayed.is_some());
    }

    #[test]
    fn prop_unreachable_view_is_retried_at_most_once(n in 1usize..6, use_resetter in any::<bool>()) {
        let navigator: Navigator<RecordingSession> = Navigator::new(NavigatorConfig::immediate());
        for i in 0..n {
            let expected = format!("p{i}");
            let mut step = StepDef::new(
                ViewDescriptor::new(expected.clone(), move |s: &RecordingSession, _: &dyn Subject| {
                    s.page() == expected
                })
                .shared(),
            )
            .with_action(|s: &mut RecordingSession, ctx| {
                s.record(format!("click:{}", ctx.step));
                Ok(())
            });
            if i > 0 {
                step = step.with_prerequisite(Prerequisite::sibling(format!("S{}", i - 1)));
            }
            navigator
                .registry()
                .register::<Application, _>(format!("S{i}"), step)
                .unwrap();
        }
        let mut session = RecordingSession::new("nowhere");

        let err = navigator
            .navigate_to_with(
                &mut session,
                &app(),
                &format!("S{}", n - 1),
                NavigateOptions { use_resetter },
            )
            .unwrap_err();

        let is_navigation_failure = matches!(err, NavError::NavigationFailed { .. });
        prop_assert!(is_navigation_failure);
        // The chain stops at its first step
        let expected_refreshes = usize::from(use_resetter);
        prop_assert_eq!(session.refresh_count(), expected_refreshes);
        let clicks = session.actions().iter().filter(|a| a.as_str() == "click:S0").count();
        prop_assert_eq!(clicks, 1 + expected_refreshes);
    }
}
