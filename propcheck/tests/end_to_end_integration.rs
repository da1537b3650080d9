//! End-to-end tests: properties built from composed generators, run through
//! the public runner API.

use std::time::Duration;

use rand::Rng;

use propcheck::{
    FailureKind, Generator, GeneratorConfig, ParallelConfig, PropertyError, RunMode, Runner,
    ShrinkOutcome, TestConfig, booleans, check, check_with_config, constant, elements, fallible,
    frequency, from_fn, int_range, list, non_empty, one_of, property, property_with, recursive,
    sized, string, tuple2,
};

fn seeded(iterations: usize, seed: u64) -> Runner {
    Runner::new(TestConfig::default().with_iterations(iterations).with_seed(seed))
}

fn parse_pair(rendered: &str) -> (i32, i32) {
    let inner = rendered.trim_start_matches('(').trim_end_matches(')');
    let mut parts = inner.split(", ").map(|part| part.parse::<i32>().unwrap());
    (parts.next().unwrap(), parts.next().unwrap())
}

#[test]
fn test_threshold_property_shrinks_to_fifty() {
    let prop = property("x<50", int_range(0, 1000), |x: &i32| *x < 50);

    for seed in [1, 2, 3, 99, 12345] {
        let result = seeded(200, seed).check(&prop).unwrap();
        assert!(!result.passed);
        assert_eq!(result.shrunk_counterexample.as_deref(), Some("50"));
        assert_eq!(result.shrink_outcome, Some(ShrinkOutcome::Minimized));
        assert_eq!(result.num_passed + result.num_failed, result.num_tests);
    }
}

#[test]
fn test_reverse_involution_passes() {
    fn reverse(s: &str) -> String {
        s.chars().rev().collect()
    }

    let prop = property("reverse involution", string(0, 20), |s: &String| {
        reverse(&reverse(s)) == *s
    });
    let result = check(&prop).unwrap();

    assert!(result.passed);
    assert_eq!(result.num_passed, 100);
    assert_eq!(result.num_failed, 0);
    assert!(result.raw_counterexample.is_none());
    assert!(result.shrunk_counterexample.is_none());
}

#[test]
fn test_buggy_reverse_is_caught() {
    // Drops the last character of strings longer than three
    fn buggy_reverse(s: &str) -> String {
        let reversed: String = s.chars().rev().collect();
        if reversed.chars().count() > 3 {
            reversed.chars().skip(1).collect()
        } else {
            reversed
        }
    }

    let prop = property("reverse length", string(0, 20), |s: &String| {
        buggy_reverse(s).chars().count() == s.chars().count()
    });
    let result = seeded(200, 8).check(&prop).unwrap();

    assert!(!result.passed);
    // Four characters, all shrunk to the simplest one
    assert_eq!(result.shrunk_counterexample.as_deref(), Some("\"aaaa\""));
}

#[test]
fn test_pair_sum_shrinks_to_boundary() {
    let prop = property(
        "sum below 100",
        tuple2(int_range(0, 100), int_range(0, 100)),
        |(a, b): &(i32, i32)| a + b < 100,
    );
    let result = seeded(100, 21).check(&prop).unwrap();

    assert!(!result.passed);
    let (a, b) = parse_pair(result.shrunk_counterexample.as_deref().unwrap());
    assert_eq!(a + b, 100);

    let (raw_a, raw_b) = parse_pair(result.raw_counterexample.as_deref().unwrap());
    assert!(raw_a + raw_b >= 100);
}

#[test]
fn test_custom_struct_via_map() {
    #[derive(Debug, Clone, PartialEq)]
    struct User {
        name: String,
        age: u8,
        admin: bool,
    }

    let users = tuple2(string(1, 12), tuple2(int_range(0u8, 120), booleans()))
        .map(|(name, (age, admin))| User { name, age, admin });

    let prop = property("names are short", users.clone(), |user: &User| {
        !user.name.is_empty() && user.name.len() <= 12 && user.age <= 120
    });
    assert!(seeded(300, 4).check(&prop).unwrap().passed);

    let prop = property("nobody is old", users, |user: &User| user.age < 100);
    let result = seeded(300, 4).check(&prop).unwrap();
    assert!(!result.passed);
    // Mapped generators do not shrink
    assert_eq!(result.shrink_steps, 0);
    assert_eq!(result.raw_counterexample, result.shrunk_counterexample);
    assert!(result.raw_counterexample.unwrap().starts_with("User"));
}

#[test]
fn test_list_property_shrinks_to_minimal_list() {
    let prop = property(
        "no element above 90",
        list(int_range(0, 100), 0, 20),
        |values: &Vec<i32>| values.iter().all(|v| *v <= 90),
    );
    let result = seeded(200, 17).check(&prop).unwrap();

    assert!(!result.passed);
    assert_eq!(result.shrunk_counterexample.as_deref(), Some("[91]"));
}

#[test]
fn test_exhaustive_mode_measures_failure_rate() {
    let prop = property("mostly small", int_range(0, 99), |x: &i32| *x < 90);
    let config = TestConfig::default()
        .with_iterations(1000)
        .with_seed(5)
        .with_mode(RunMode::Exhaustive);
    let result = check_with_config(&prop, config).unwrap();

    assert_eq!(result.num_tests, 1000);
    assert!(result.num_failed > 50 && result.num_failed < 150);
    assert_eq!(result.shrunk_counterexample.as_deref(), Some("90"));
}

#[test]
fn test_exception_cause_is_preserved() {
    let prop = property("indexing", list(int_range(0, 9), 0, 4), |values: &Vec<i32>| {
        values[2] >= 0
    });
    let result = seeded(100, 6).check(&prop).unwrap();

    assert!(!result.passed);
    let record = result.failure.unwrap();
    assert!(matches!(record.kind, FailureKind::PredicateException { .. }));
    assert!(record.kind.cause().unwrap().contains("index out of bounds"));
}

#[test]
fn test_fallible_predicate_message() {
    let prop = property_with(
        "even",
        int_range(0, 1000),
        fallible(|x: &i32| {
            if x % 2 == 0 {
                Ok(())
            } else {
                Err(format!("{x} is odd"))
            }
        }),
    );
    let result = seeded(100, 10).check(&prop).unwrap();

    assert!(!result.passed);
    let cause = match result.failure.unwrap().kind {
        FailureKind::PredicateException { cause } => cause,
        other => panic!("unexpected failure kind: {other:?}"),
    };
    assert!(cause.ends_with("is odd"));
    assert_eq!(result.shrink_steps, 0);
    assert_eq!(result.shrunk_counterexample, result.raw_counterexample);
}

#[test]
fn test_panicking_failure_shrinks_to_false_boundary() {
    let prop = property("mixed", int_range(0, 1000), |x: &i32| {
        if *x > 500 {
            panic!("{x} is too large");
        }
        *x < 50
    });

    for seed in [1, 2, 3] {
        let result = seeded(100, seed).check(&prop).unwrap();
        assert!(!result.passed);
        assert_eq!(result.shrunk_counterexample.as_deref(), Some("50"));
        assert_eq!(result.shrink_outcome, Some(ShrinkOutcome::Minimized));
    }
}

#[test]
fn test_adapted_generators_shrink() {
    let below_fifty = |x: &i32| *x < 50;

    let prop = property("map", int_range(0, 1000).map(|x| x).shrinkable(), below_fifty);
    let result = seeded(100, 8).check(&prop).unwrap();
    assert_eq!(result.shrunk_counterexample.as_deref(), Some("50"));

    let prop = property(
        "from_fn",
        from_fn(|rng, _| Ok(rng.gen_range(0i32..1000))).shrinkable(),
        below_fifty,
    );
    let result = seeded(100, 8).check(&prop).unwrap();
    assert_eq!(result.shrunk_counterexample.as_deref(), Some("50"));

    let prop = property(
        "sized",
        sized(|size| list(int_range(0, 100), 0, size)),
        |values: &Vec<i32>| values.iter().all(|v| *v < 50),
    );
    let result = seeded(200, 8).check(&prop).unwrap();
    assert_eq!(result.shrunk_counterexample.as_deref(), Some("[50]"));
}

#[test]
fn test_recursive_generator_shrinks() {
    let numbers = recursive(int_range(0, 1000), 3, |inner| {
        one_of(vec![inner.clone(), inner.map(|x| x / 2).boxed()]).boxed()
    });
    let prop = property("x<50", numbers, |x: &i32| *x < 50);
    let result = seeded(100, 21).check(&prop).unwrap();

    assert!(!result.passed);
    assert_eq!(result.shrunk_counterexample.as_deref(), Some("50"));
}

#[test]
fn test_generator_exhaustion_aborts_run() {
    let prop = property("never", non_empty(list(booleans(), 0, 0)), |_: &Vec<bool>| {
        true
    });
    let error = seeded(10, 1).check(&prop).unwrap_err();

    match error {
        PropertyError::GeneratorExhausted {
            property,
            attempts,
            iteration,
        } => {
            assert_eq!(property, "never");
            assert_eq!(attempts, 1000);
            assert_eq!(iteration, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_frequency_and_elements() {
    let generator = frequency(vec![
        (9, elements(vec!["red", "green"]).boxed()),
        (1, constant("blue").boxed()),
        (0, constant("never").boxed()),
    ]);
    let prop = property("known colours", generator, |colour: &&str| *colour != "never");
    let result = seeded(500, 2).check(&prop).unwrap();
    assert!(result.passed);
}

#[test]
fn test_recursive_tree_property() {
    #[derive(Debug, Clone)]
    enum Tree {
        Leaf(u8),
        Node(Vec<Tree>),
    }

    fn leaves(tree: &Tree) -> usize {
        match tree {
            Tree::Leaf(_) => 1,
            Tree::Node(children) => children.iter().map(leaves).sum(),
        }
    }

    let trees = recursive(int_range(0u8, 9).map(Tree::Leaf), 4, |inner| {
        one_of(vec![
            int_range(0u8, 9).map(Tree::Leaf).boxed(),
            list(inner, 0, 3).map(Tree::Node).boxed(),
        ])
        .boxed()
    });

    // At most three children per node and four levels of nesting
    let prop = property("bounded size", trees, |tree: &Tree| leaves(tree) <= 81);
    let config = TestConfig::default()
        .with_seed(77)
        .with_generator_config(GeneratorConfig::default().with_max_depth(4));
    assert!(check_with_config(&prop, config).unwrap().passed);
}

#[test]
fn test_builder_and_shrink_timeout() {
    let prop = property("slow", int_range(0, 1_000_000), |x: &i32| {
        std::thread::sleep(Duration::from_millis(1));
        *x < 10
    });
    let runner = Runner::builder()
        .iterations(50)
        .seed(31)
        .shrink_timeout(Duration::from_millis(5))
        .build()
        .unwrap();
    let result = runner.check(&prop).unwrap();

    assert!(!result.passed);
    assert_eq!(result.shrink_outcome, Some(ShrinkOutcome::TimedOut));
}

#[test]
fn test_tally_mode() {
    let prop = property("under 900", int_range(0, 999), |x: &i32| *x < 900);
    let report = seeded(2000, 13)
        .tally(&prop, &ParallelConfig::with_threads(4))
        .unwrap();

    assert_eq!(report.num_tests, 2000);
    assert!((0.05..0.15).contains(&report.failure_rate()));
    let first: i32 = report.first_failure.unwrap().parse().unwrap();
    assert!(first >= 900);
}
