//! Heuristic tag and explanation inference.
//!
//! Two independent passes run when a snippet is created:
//!
//! - [`infer_tags`] picks 2–3 tags from a fixed per-language vocabulary using
//!   an injected random source. Repeat calls with the same input may differ
//!   unless the caller fixes the seed.
//! - [`infer_explanation`] walks [`EXPLANATION_RULES`] in priority order and
//!   renders the first rule whose predicate matches. It is pure: the same
//!   `(code, language)` always yields the same text.
//!
//! Every explanation is a base sentence followed by conditional clauses.
//! Clauses that do not apply are omitted, and the remaining parts are joined
//! with single spaces.

use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;

/// Vocabulary used for languages without a dedicated entry.
pub const FALLBACK_TAGS: &[&str] = &["syntax", "code", "algorithm"];

/// Candidate tag vocabulary for `language` (case-insensitive).
pub fn tag_vocabulary(language: &str) -> &'static [&'static str] {
    match language.to_lowercase().as_str() {
        "javascript" => &["function", "array", "object", "loop"],
        "python" => &["function", "list", "dictionary", "loop"],
        "java" => &["class", "method", "collection", "loop"],
        "csharp" => &["class", "method", "collection", "LINQ"],
        "html" => &["div", "form", "input", "structure"],
        "css" => &["style", "layout", "responsive", "animation"],
        _ => FALLBACK_TAGS,
    }
}

/// Select a random subset of 2 or 3 distinct tags from the language vocabulary.
///
/// The vocabulary is keyed by language only; `code` is accepted so callers
/// can treat tagging and explanation uniformly.
pub fn infer_tags<R: Rng + ?Sized>(_code: &str, language: &str, rng: &mut R) -> Vec<String> {
    let vocabulary = tag_vocabulary(language);
    let count = rng.gen_range(2..=3).min(vocabulary.len());
    vocabulary
        .choose_multiple(rng, count)
        .map(|tag| tag.to_string())
        .collect()
}

/// Borrowed view of the inputs a rule inspects.
#[derive(Debug, Clone, Copy)]
pub struct CodeInput<'a> {
    pub code: &'a str,
    pub language: &'a str,
}

impl CodeInput<'_> {
    fn has(&self, needle: &str) -> bool {
        self.code.contains(needle)
    }

    fn has_any(&self, needles: &[&str]) -> bool {
        needles.iter().any(|n| self.code.contains(n))
    }

    fn is(&self, language: &str) -> bool {
        self.language == language
    }
}

/// One entry of the ordered explanation rule table.
pub struct ExplanationRule {
    /// Stable identifier, used in logs and tests.
    pub name: &'static str,
    pub matches: fn(&CodeInput<'_>) -> bool,
    pub explain: fn(&CodeInput<'_>) -> String,
}

/// Explanation rules in priority order. The first match wins.
pub static EXPLANATION_RULES: &[ExplanationRule] = &[
    ExplanationRule {
        name: "database_connection",
        matches: |i| i.has("mongoose") && i.has("connectDB"),
        explain: explain_database_connection,
    },
    ExplanationRule {
        name: "state_hook",
        matches: |i| i.has("useState") && i.has_any(&["setCount", "setState", "set"]),
        explain: explain_state_hook,
    },
    ExplanationRule {
        name: "array_transformation",
        matches: |i| i.is("javascript") && i.has_any(&[".map(", ".filter(", ".reduce("]),
        explain: explain_array_transformation,
    },
    ExplanationRule {
        name: "comprehension",
        matches: |i| i.is("python") && i.has("[") && i.has("for") && i.has("in"),
        explain: explain_comprehension,
    },
    ExplanationRule {
        name: "async_flow",
        matches: |i| i.is("javascript") && i.has_any(&["async", "await", "Promise"]),
        explain: explain_async_flow,
    },
    ExplanationRule {
        name: "ui_component",
        matches: |i| {
            i.is("javascript")
                && i.has("React")
                && i.has_any(&["function", "class"])
                && i.has("return")
                && i.has("<")
        },
        explain: explain_ui_component,
    },
    ExplanationRule {
        name: "stylesheet",
        matches: |i| i.is("css") || i.is("scss"),
        explain: explain_stylesheet,
    },
    ExplanationRule {
        name: "python_function",
        matches: |i| i.is("python") && i.has("def "),
        explain: explain_python_function,
    },
    ExplanationRule {
        name: "html_document",
        matches: |i| {
            i.is("html") || i.has("<!DOCTYPE html>") || (i.has("<html") && i.has("<body"))
        },
        explain: explain_html_document,
    },
    ExplanationRule {
        name: "config_object",
        matches: |i| {
            (i.is("json") || (i.has("{") && i.has(":") && !i.has("function"))) && !i.has("=>")
        },
        explain: explain_config_object,
    },
];

/// The first rule in [`EXPLANATION_RULES`] matching the input, if any.
pub fn matching_rule(code: &str, language: &str) -> Option<&'static ExplanationRule> {
    let input = CodeInput { code, language };
    EXPLANATION_RULES.iter().find(|rule| (rule.matches)(&input))
}

/// Produce a human-readable explanation for a snippet.
pub fn infer_explanation(code: &str, language: &str) -> String {
    let input = CodeInput { code, language };
    match matching_rule(code, language) {
        Some(rule) => (rule.explain)(&input),
        None => explain_fallback(&input),
    }
}

/// Join the present parts with single spaces.
fn compose(parts: &[Option<&str>]) -> String {
    parts
        .iter()
        .flatten()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

fn when(condition: bool, clause: &str) -> Option<&str> {
    condition.then_some(clause)
}

static STATE_DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"const\s+\[\s*(\w+)\s*,\s*set(\w+)\s*\]\s*=\s*useState").expect("valid regex")
});
static STATE_INITIAL_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"useState\(([^)]+)\)").expect("valid regex"));
static PY_FUNCTION_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"def\s+(\w+)\s*\(").expect("valid regex"));
static PY_FUNCTION_DEF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"def\s+\w+").expect("valid regex"));

fn explain_database_connection(_input: &CodeInput<'_>) -> String {
    "Establishes a MongoDB database connection using Mongoose ODM. Includes error handling \
     and environment variable configuration. Uses a singleton pattern for connection management."
        .to_string()
}

fn explain_state_hook(i: &CodeInput<'_>) -> String {
    let state_var = STATE_DECLARATION
        .captures(i.code)
        .and_then(|c| c.get(1))
        .map_or("state", |m| m.as_str());
    let initial_value = STATE_INITIAL_VALUE
        .captures(i.code)
        .and_then(|c| c.get(1))
        .map_or("0", |m| m.as_str());
    let base = format!(
        "Creates a React state variable '{}' with initial value {}.",
        state_var, initial_value
    );
    compose(&[
        Some(base.as_str()),
        Some("Provides a setter function for state updates."),
        when(
            i.has("prev"),
            "Uses functional updates for handling previous state values.",
        ),
    ])
}

fn explain_array_transformation(i: &CodeInput<'_>) -> String {
    let methods: Vec<&str> = [(".map(", "map"), (".filter(", "filter"), (".reduce(", "reduce")]
        .iter()
        .filter(|(needle, _)| i.has(needle))
        .map(|(_, name)| *name)
        .collect();
    let base = format!(
        "Uses JavaScript's {} {} for functional array transformation.",
        methods.join(", "),
        if methods.len() > 1 { "methods" } else { "method" }
    );
    compose(&[
        Some(base.as_str()),
        when(i.has("=>"), "Implements arrow functions for concise callbacks."),
        when(!i.has("var "), "Follows immutability principles."),
    ])
}

fn explain_comprehension(i: &CodeInput<'_>) -> String {
    let kind = if i.has("{") && i.has(":") {
        "dictionary comprehension"
    } else if i.has("(") && i.has("for") && !i.has("[") {
        "generator expression"
    } else {
        "list comprehension"
    };
    let base = format!("Implements Python {} for concise collection creation.", kind);
    compose(&[
        Some(base.as_str()),
        when(i.has("if"), "Includes conditional filtering of elements."),
        when(i.has("range"), "Uses range() function to generate a sequence."),
        Some("Creates a new collection without modifying the original data."),
    ])
}

fn explain_async_flow(i: &CodeInput<'_>) -> String {
    let base = format!(
        "Manages asynchronous operations using {}.",
        if i.has("async") {
            "modern async/await syntax"
        } else {
            "Promise-based patterns"
        }
    );
    compose(&[
        Some(base.as_str()),
        when(
            i.has("try") && i.has("catch"),
            "Includes error handling with try/catch.",
        ),
        when(
            i.has("Promise.all"),
            "Uses Promise.all for parallel execution.",
        ),
    ])
}

fn explain_ui_component(i: &CodeInput<'_>) -> String {
    let is_class = i.has("class") && i.has("extends");
    let has_state = i.has("useState") || (is_class && i.has("this.state"));
    let has_effect = i.has("useEffect")
        || (is_class && i.has_any(&["componentDidMount", "componentDidUpdate"]));

    let base = format!(
        "Defines a {} React component that renders UI elements.",
        if is_class { "class-based" } else { "functional" }
    );
    let state = format!(
        "Manages component state using {}.",
        if is_class { "this.state" } else { "useState hook" }
    );
    let effect = format!(
        "Handles side effects with {}.",
        if is_class {
            "lifecycle methods"
        } else {
            "useEffect hook"
        }
    );
    compose(&[
        Some(base.as_str()),
        when(has_state, &state),
        when(has_effect, &effect),
        when(i.has("map("), "Renders lists using array mapping."),
    ])
}

fn explain_stylesheet(i: &CodeInput<'_>) -> String {
    compose(&[
        Some("Defines CSS styling for web elements."),
        when(
            i.has_any(&["display: flex", "display:flex"]),
            "Uses Flexbox for layout.",
        ),
        when(
            i.has_any(&["display: grid", "display:grid"]),
            "Implements CSS Grid system.",
        ),
        when(
            i.has("@media"),
            "Includes responsive design with media queries.",
        ),
        when(
            i.has("var(--"),
            "Uses CSS variables for theme consistency.",
        ),
    ])
}

fn explain_python_function(i: &CodeInput<'_>) -> String {
    let function_name = PY_FUNCTION_NAME
        .captures(i.code)
        .and_then(|c| c.get(1))
        .map_or("function", |m| m.as_str());

    if i.has("whisper") && i.has("transcribe") {
        let input_kind = format!(
            "Takes a {} and returns transcribed text.",
            if i.has("video_path") {
                "video file path"
            } else {
                "audio/video input"
            }
        );
        return compose(&[
            Some("Converts audio/video speech to text using OpenAI's Whisper model."),
            Some(input_kind.as_str()),
            when(
                i.has("translate"),
                "Also translates non-English content to English.",
            ),
        ]);
    }

    if i.has_any(&["pandas", "pd."]) {
        let analyzes = function_name.contains("analyze") || function_name.contains("process");
        return compose(&[
            Some("Performs data manipulation using Pandas library."),
            Some(if analyzes {
                "Analyzes and transforms data."
            } else {
                "Handles data frames or series operations."
            }),
            when(i.has("read_"), "Imports data from external sources."),
            when(i.has_any(&["plot", "fig"]), "Includes data visualization."),
        ]);
    }

    if i.has_any(&["numpy", "np."]) {
        return compose(&[
            Some("Implements numerical computing operations using NumPy."),
            when(i.has("array"), "Works with array data structures."),
            when(
                i.has("random"),
                "Includes randomization or statistical functions.",
            ),
            when(i.has("linalg"), "Performs linear algebra operations."),
        ]);
    }

    if i.has_any(&["requests.", "requests "]) {
        return compose(&[
            Some("Makes HTTP requests to web services or APIs."),
            when(
                i.has(".json()"),
                "Processes JSON responses from web requests.",
            ),
            when(i.has("headers"), "Uses custom headers in the requests."),
            when(i.has("auth"), "Implements authentication for API access."),
        ]);
    }

    // `def ` may appear without a parsable name after it; count zero as one.
    let definitions = PY_FUNCTION_DEF.find_iter(i.code).count();
    let subject = if definitions > 1 {
        "multiple Python functions".to_string()
    } else {
        format!("the '{}' function", function_name)
    };
    let base = format!(
        "Defines {} that {}",
        subject,
        if i.has("return") {
            "processes data and returns results."
        } else {
            "performs operations."
        }
    );
    compose(&[
        Some(base.as_str()),
        when(
            i.has("import"),
            "Uses external libraries for extended functionality.",
        ),
        when(
            i.has_any(&["\"\"\"", "'''"]),
            "Includes docstring documentation.",
        ),
        when(i.has("except"), "Implements exception handling."),
    ])
}

fn explain_html_document(i: &CodeInput<'_>) -> String {
    compose(&[
        Some("Defines HTML structure for a web page."),
        when(i.has("<head>"), "Includes metadata in head section."),
        when(i.has("<div"), "Uses div containers for layout."),
        when(
            i.has_any(&["<header", "<nav", "<footer"]),
            "Implements semantic HTML elements.",
        ),
        when(i.has("<form"), "Contains forms for user input."),
    ])
}

fn explain_config_object(i: &CodeInput<'_>) -> String {
    let base = format!(
        "Defines a {} with {} properties.",
        if i.is("json") {
            "JSON data structure"
        } else {
            "configuration object"
        },
        if i.code.split('\n').count() < 10 {
            "simple"
        } else {
            "nested"
        }
    );
    compose(&[
        Some(base.as_str()),
        when(i.has("dependencies"), "Lists package dependencies."),
        when(i.has("scripts"), "Defines runnable commands."),
        when(i.has("version"), "Specifies version information."),
    ])
}

fn explain_fallback(i: &CodeInput<'_>) -> String {
    match i.language.to_lowercase().as_str() {
        "javascript" => {
            let base = format!(
                "Implements JavaScript code {}.",
                if i.has("function") {
                    "with defined functions"
                } else if i.has("class") {
                    "using object-oriented structure"
                } else {
                    "for data manipulation"
                }
            );
            compose(&[
                Some(base.as_str()),
                when(i.has_any(&["const", "let"]), "Uses modern ES6+ syntax."),
                when(
                    i.has_any(&["import", "export"]),
                    "Utilizes JavaScript module system.",
                ),
            ])
        }
        "python" => {
            let base = format!(
                "Implements Python {} code.",
                if i.has("class") {
                    "object-oriented"
                } else if i.has("def ") {
                    "function-based"
                } else {
                    "procedural"
                }
            );
            compose(&[
                Some(base.as_str()),
                when(i.has("import"), "Imports external libraries."),
                when(
                    i.has("if __name__ =="),
                    "Includes proper module execution control.",
                ),
            ])
        }
        "java" => {
            let base = format!(
                "Defines Java code with {}.",
                if i.has("class") {
                    "object-oriented structure"
                } else {
                    "fundamental syntax"
                }
            );
            compose(&[
                Some(base.as_str()),
                when(
                    i.has("public static void main"),
                    "Includes application entry point.",
                ),
                when(i.has("extends"), "Uses inheritance hierarchy."),
            ])
        }
        "html" => compose(&[
            Some("Creates HTML markup for web page structure."),
            when(i.has("class="), "Uses CSS classes for styling."),
            when(i.has("<form"), "Implements form elements for user input."),
        ]),
        "css" => compose(&[
            Some("Defines CSS styling for visual presentation."),
            when(i.has("@media"), "Implements responsive design."),
            when(i.has("@keyframes"), "Contains animations."),
        ]),
        _ => {
            let base = format!(
                "Implements {} code with standard {} syntax and practices.",
                i.language, i.language
            );
            compose(&[
                Some(base.as_str()),
                when(
                    i.has_any(&["function", "def "]),
                    "Contains reusable code blocks.",
                ),
                when(
                    i.has_any(&["import", "include"]),
                    "References external libraries.",
                ),
            ])
        }
    }
}
