use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use matcher::{Bindings, Value};

use crate::convert::toml_to_value;

const CASE_SUFFIX: &str = ".test.toml";

#[derive(Debug, Deserialize)]
pub struct TestCase {
    /// Human-readable test description.
    #[serde(default)]
    pub description: Option<String>,

    /// The pattern under test.
    pub pattern: String,

    /// The candidate value. Required unless a syntax error is expected.
    #[serde(default)]
    pub value: Option<toml::Value>,

    /// If true, the test expects the pattern to fail to compile.
    #[serde(default)]
    pub expect_syntax_error: bool,

    /// Whether the value should match. Defaults to true.
    #[serde(default = "default_expect_match")]
    pub expect_match: bool,

    /// Exact expected bindings. Only checked on a successful match.
    #[serde(default)]
    pub expect_bindings: Option<toml::Table>,
}

fn default_expect_match() -> bool {
    true
}

pub enum TestOutcome {
    Pass,
    Fail(String),
}

pub struct TestResult {
    pub path: PathBuf,
    pub description: Option<String>,
    pub outcome: TestOutcome,
}

fn run_single_test(path: &Path) -> TestResult {
    let fail = |description: Option<String>, reason: String| TestResult {
        path: path.to_path_buf(),
        description,
        outcome: TestOutcome::Fail(reason),
    };

    // 1. Read and parse the case file
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => return fail(None, format!("cannot read file: {}", e)),
    };
    let case: TestCase = match toml::from_str(&content) {
        Ok(c) => c,
        Err(e) => return fail(None, format!("TOML parse error: {}", e)),
    };
    let description = case.description.clone();

    // 2. Compile, handling expect_syntax_error
    let compiled = seqpat::compile(&case.pattern);
    if case.expect_syntax_error {
        return match compiled {
            Err(_) => TestResult {
                path: path.to_path_buf(),
                description,
                outcome: TestOutcome::Pass,
            },
            Ok(t) => fail(
                description,
                format!("expected syntax error, but pattern compiled to {}", t),
            ),
        };
    }
    let template = match compiled {
        Ok(t) => t,
        Err(e) => return fail(description, format!("unexpected syntax error: {}", e)),
    };

    // 3. Build the candidate value
    let Some(raw_value) = &case.value else {
        return fail(description, "missing `value`".into());
    };
    let value = match toml_to_value(raw_value) {
        Ok(v) => v,
        Err(e) => return fail(description, format!("invalid value: {}", e)),
    };

    // 4. Match and compare
    let reason = match (case.expect_match, matcher::explain(&template, &value)) {
        (false, Err(_)) => None,
        (false, Ok(bindings)) => Some(format!(
            "expected no match, but matched with:\n{}",
            indent(&bindings.to_string())
        )),
        (true, Err(mismatch)) => Some(format!("expected a match, got: {}", mismatch)),
        (true, Ok(bindings)) => match &case.expect_bindings {
            Some(expected) => check_bindings(&bindings, expected),
            None => None,
        },
    };

    match reason {
        Some(reason) => fail(description, reason),
        None => TestResult {
            path: path.to_path_buf(),
            description,
            outcome: TestOutcome::Pass,
        },
    }
}

/// Compare actual bindings to the expected table. Returns `Some(reason)` on mismatch.
fn check_bindings(actual: &Bindings, expected: &toml::Table) -> Option<String> {
    let mut want: BTreeMap<String, Value> = BTreeMap::new();
    for (name, raw) in expected {
        match toml_to_value(raw) {
            Ok(v) => {
                want.insert(name.clone(), v);
            }
            Err(e) => return Some(format!("invalid expected binding '{}': {}", name, e)),
        }
    }

    let want = Bindings::from(want);
    if *actual == want {
        None
    } else {
        Some(format!(
            "bindings mismatch\n  expected:\n{}\n  actual:\n{}",
            indent(&want.to_string()),
            indent(&actual.to_string())
        ))
    }
}

fn indent(text: &str) -> String {
    if text.trim().is_empty() {
        return "    (none)".to_string();
    }
    text.lines()
        .map(|line| format!("    {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Discover case files grouped by category (subfolder relative to root).
/// Files directly in `root` get category "" (uncategorized).
/// Returns a BTreeMap so categories are sorted alphabetically.
fn discover_categorized(root: &Path) -> BTreeMap<String, Vec<PathBuf>> {
    let mut categories: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    collect_tests(root, root, &mut categories);
    for files in categories.values_mut() {
        files.sort();
    }
    categories
}

fn collect_tests(dir: &Path, root: &Path, out: &mut BTreeMap<String, Vec<PathBuf>>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_tests(&path, root, out);
        } else if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.ends_with(CASE_SUFFIX) {
                let category = path
                    .parent()
                    .and_then(|p| p.strip_prefix(root).ok())
                    .map(|p| p.to_string_lossy().replace('\\', "/"))
                    .unwrap_or_default();
                out.entry(category).or_default().push(path);
            }
        }
    }
}

/// List available categories for the given test path.
pub fn list_categories(path: &Path) {
    if path.is_file() {
        eprintln!("(single file, no categories)");
        return;
    }

    let categories = discover_categorized(path);
    if categories.is_empty() {
        eprintln!("no {} files found in {}", CASE_SUFFIX, path.display());
        return;
    }

    eprintln!("available categories:");
    for (cat, files) in &categories {
        let label = if cat.is_empty() { "(root)" } else { cat.as_str() };
        eprintln!("  {} ({} tests)", label, files.len());
    }
}

fn pass_label(no_color: bool) -> &'static str {
    if no_color { "PASS" } else { "\x1b[32mPASS\x1b[0m" }
}

fn fail_label(no_color: bool) -> &'static str {
    if no_color { "FAIL" } else { "\x1b[31mFAIL\x1b[0m" }
}

fn bold(s: &str, no_color: bool) -> String {
    if no_color {
        s.to_string()
    } else {
        format!("\x1b[1m{}\x1b[0m", s)
    }
}

fn result_label(result: &TestResult) -> &str {
    result.description.as_deref().unwrap_or_else(|| {
        result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .and_then(|s| s.strip_suffix(CASE_SUFFIX))
            .unwrap_or("?")
    })
}

/// Run every case file under `path` (or a single file).
/// If `categories` is non-empty, only run cases in those categories.
/// Returns exit code: 0 = all pass, 1 = any failure.
pub fn run_tests(path: &Path, no_color: bool, categories: &[String]) -> i32 {
    let run_categories: BTreeMap<String, Vec<PathBuf>> = if path.is_file() {
        BTreeMap::from([(String::new(), vec![path.to_path_buf()])])
    } else {
        let all_categories = discover_categorized(path);
        if all_categories.is_empty() {
            eprintln!("no {} files found in {}", CASE_SUFFIX, path.display());
            return 1;
        }
        filter_categories(all_categories, categories)
    };

    if run_categories.is_empty() {
        eprintln!("no matching categories found");
        return 1;
    }

    let mut passed = 0usize;
    let mut failures: Vec<TestResult> = Vec::new();

    for (cat, files) in &run_categories {
        let header = if cat.is_empty() { "(root)" } else { cat.as_str() };
        eprintln!();
        eprintln!("{}", bold(header, no_color));

        for file in files {
            let result = run_single_test(file);
            match &result.outcome {
                TestOutcome::Pass => {
                    passed += 1;
                    eprintln!("  {}  {}", pass_label(no_color), result_label(&result));
                }
                TestOutcome::Fail(_) => {
                    eprintln!("  {}  {}", fail_label(no_color), result_label(&result));
                    failures.push(result);
                }
            }
        }
    }

    if !failures.is_empty() {
        eprintln!();
        eprintln!("failures:");
        for f in &failures {
            eprintln!();
            eprintln!("  --- {} ---", f.path.display());
            if let TestOutcome::Fail(reason) = &f.outcome {
                for line in reason.lines() {
                    eprintln!("  {}", line);
                }
            }
        }
    }

    eprintln!();
    let failed = failures.len();
    if failed == 0 {
        let ok = if no_color { "ok" } else { "\x1b[32mok\x1b[0m" };
        eprintln!("test result: {}. {} passed, 0 failed", ok, passed);
        0
    } else {
        let failed_label = if no_color { "FAILED" } else { "\x1b[31mFAILED\x1b[0m" };
        eprintln!(
            "test result: {}. {} passed, {} failed (of {})",
            failed_label,
            passed,
            failed,
            passed + failed
        );
        1
    }
}

fn filter_categories(
    all_categories: BTreeMap<String, Vec<PathBuf>>,
    requested: &[String],
) -> BTreeMap<String, Vec<PathBuf>> {
    if requested.is_empty() {
        return all_categories;
    }

    let available: Vec<String> = all_categories
        .keys()
        .map(|k| if k.is_empty() { "(root)".to_string() } else { k.clone() })
        .collect();

    let mut filtered = BTreeMap::new();
    for req in requested {
        let req = req.trim_matches('/');
        let prefix = format!("{}/", req);
        let mut found = false;
        for (cat, files) in &all_categories {
            if cat == req || cat.starts_with(&prefix) {
                filtered.insert(cat.clone(), files.clone());
                found = true;
            }
        }
        if !found {
            eprintln!(
                "warning: category '{}' not found (available: {})",
                req,
                available.join(", ")
            );
        }
    }
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_case(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, body).expect("failed to write case file");
        path
    }

    fn outcome(path: &Path) -> Result<(), String> {
        match run_single_test(path).outcome {
            TestOutcome::Pass => Ok(()),
            TestOutcome::Fail(reason) => Err(reason),
        }
    }

    #[test]
    fn passing_case_with_bindings() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = write_case(
            dir.path(),
            "greedy.test.toml",
            r#"
pattern = "(a *rest b)"
value = [1, 2, 3, 4, 5]

[expect_bindings]
a = 1
rest = [2, 3, 4]
b = 5
"#,
        );
        assert_eq!(outcome(&path), Ok(()));
    }

    #[test]
    fn binding_mismatch_is_reported() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = write_case(
            dir.path(),
            "wrong.test.toml",
            r#"
pattern = "(a b)"
value = [1, 2]
expect_bindings = { a = 1, b = 3 }
"#,
        );
        let reason = outcome(&path).unwrap_err();
        assert!(reason.contains("bindings mismatch"), "{}", reason);
        assert!(reason.contains("b = 3"), "{}", reason);
    }

    #[test]
    fn expected_failures() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let no_match = write_case(
            dir.path(),
            "no_match.test.toml",
            "pattern = \"(a a)\"\nvalue = [1, 2]\nexpect_match = false\n",
        );
        assert_eq!(outcome(&no_match), Ok(()));

        let syntax = write_case(
            dir.path(),
            "syntax.test.toml",
            "pattern = \"(*a *b)\"\nexpect_syntax_error = true\n",
        );
        assert_eq!(outcome(&syntax), Ok(()));

        let unexpected = write_case(
            dir.path(),
            "unexpected.test.toml",
            "pattern = \"(a b)\"\nvalue = [1]\n",
        );
        let reason = outcome(&unexpected).unwrap_err();
        assert!(reason.contains("too few elements"), "{}", reason);
    }

    #[test]
    fn malformed_case_files_fail() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let missing_value = write_case(dir.path(), "a.test.toml", "pattern = \"x\"\n");
        assert_eq!(outcome(&missing_value), Err("missing `value`".to_string()));

        let bad_toml = write_case(dir.path(), "b.test.toml", "pattern = \n");
        assert!(outcome(&bad_toml).unwrap_err().starts_with("TOML parse error"));

        let table_value = write_case(
            dir.path(),
            "c.test.toml",
            "pattern = \"x\"\nvalue = { k = 1 }\n",
        );
        assert!(outcome(&table_value).unwrap_err().starts_with("invalid value"));
    }

    #[test]
    fn categories_follow_subfolders() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let nested = dir.path().join("greedy");
        std::fs::create_dir(&nested).unwrap();
        write_case(dir.path(), "top.test.toml", "pattern = \"a\"\nvalue = 1\n");
        write_case(&nested, "mid.test.toml", "pattern = \"(a *r)\"\nvalue = [1, 2]\n");
        write_case(&nested, "ignored.toml", "not a case");

        let found = discover_categorized(dir.path());
        assert_eq!(found.keys().collect::<Vec<_>>(), vec!["", "greedy"]);
        assert_eq!(found["greedy"].len(), 1);

        assert_eq!(run_tests(dir.path(), true, &[]), 0);
        assert_eq!(run_tests(dir.path(), true, &["greedy".to_string()]), 0);
        assert_eq!(run_tests(dir.path(), true, &["missing".to_string()]), 1);
    }

    #[test]
    fn failing_case_sets_exit_code() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = write_case(dir.path(), "bad.test.toml", "pattern = \"(a b)\"\nvalue = 1\n");
        assert_eq!(run_tests(&path, true, &[]), 1);
    }

    #[test]
    fn bundled_cases_pass() {
        let cases = Path::new(env!("CARGO_MANIFEST_DIR")).join("../cases");
        assert_eq!(run_tests(&cases, true, &[]), 0);
    }
}
