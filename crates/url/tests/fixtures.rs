use std::fs;

use serde_json::Value;

const PARSE_CASES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/parse.json");
const RESOLVE_CASES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/resolve.json");

/// Options are read from the case, every other key is compared against the parsed URL
const OPTION_KEYS: [&str; 3] = ["input", "parse_query_string", "slashes_denote_host"];

#[derive(Debug)]
struct Error;

fn load(path: &str) -> Vec<Value> {
    let json_data = fs::read_to_string(path).expect("fixture not found");
    serde_json::from_str(&json_data).expect("fixture contains invalid json")
}

fn flag(test_case: &serde_json::Map<String, Value>, name: &str) -> bool {
    test_case.get(name).and_then(Value::as_bool).unwrap_or_default()
}

fn run_parse_cases() -> (usize, usize) {
    let mut succeeded = 0;
    let mut run = 0;

    for test_case in load(PARSE_CASES).iter().flat_map(Value::as_object) {
        let input = test_case.get("input").and_then(Value::as_str).unwrap();
        let url = url::parse(
            input,
            flag(test_case, "parse_query_string"),
            flag(test_case, "slashes_denote_host"),
        );
        let parsed = serde_json::to_value(&url).unwrap();

        let mismatches: Vec<_> = test_case
            .iter()
            .filter(|(key, _)| !OPTION_KEYS.contains(&key.as_str()))
            .filter(|(key, expected)| parsed.get(key.as_str()) != Some(*expected))
            .collect();

        // Formatting the parsed URL and parsing it again must not change anything
        let reparsed = url::parse(
            &url.format(),
            flag(test_case, "parse_query_string"),
            flag(test_case, "slashes_denote_host"),
        );
        let round_trips = reparsed == url;

        print!("parse {:?}: ", input.escape_debug().collect::<String>());
        if mismatches.is_empty() && round_trips {
            println!("✅");
            succeeded += 1;
        } else {
            println!("❌");
            for (key, expected) in mismatches {
                println!("    {key}: expected {expected}, got {}", parsed[key.as_str()]);
            }
            if !round_trips {
                println!("    formatting and parsing again produced {:?}", reparsed.href);
            }
        }

        run += 1;
    }

    (succeeded, run)
}

fn run_resolve_cases() -> (usize, usize) {
    let mut succeeded = 0;
    let mut run = 0;

    for test_case in load(RESOLVE_CASES) {
        let [base, relative, expected] = test_case
            .as_array()
            .map(|parts| [0, 1, 2].map(|i| parts[i].as_str().unwrap()))
            .unwrap();

        let resolved = url::resolve(base, relative);
        print!("resolve {relative:?} against {base:?}: ");

        if resolved == expected {
            println!("✅");
            succeeded += 1;
        } else {
            println!("❌ expected {expected:?}, got {resolved:?}");
        }

        run += 1;
    }

    (succeeded, run)
}

fn main() -> Result<(), Error> {
    env_logger::init();

    let (parse_succeeded, parse_run) = run_parse_cases();
    let (resolve_succeeded, resolve_run) = run_resolve_cases();

    let test_cases_succeeded = parse_succeeded + resolve_succeeded;
    let test_cases_run = parse_run + resolve_run;
    println!("{test_cases_succeeded} out of {test_cases_run} test cases succeeded");

    if test_cases_run != test_cases_succeeded {
        Err(Error)
    } else {
        Ok(())
    }
}
