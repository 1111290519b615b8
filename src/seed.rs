//! Sample snippets inserted into an empty store.

use chrono::{DateTime, Utc};
use snipai_core::Snippet;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// The two demo snippets, stamped with `now`.
pub fn sample_snippets(now: DateTime<Utc>) -> Vec<Snippet> {
    vec![
        Snippet {
            id: "1".to_string(),
            title: "React useState Hook Example".to_string(),
            code: "const [count, setCount] = useState(0);\n\nconst increment = () => {\n  setCount(prevCount => prevCount + 1);\n};".to_string(),
            language: "javascript".to_string(),
            description: "Simple counter using React useState hook".to_string(),
            tags: strings(&["react", "hooks", "state"]),
            ai_tags: strings(&["function", "react", "hook"]),
            explanation: "This code implements a counter using React's useState hook. It initializes a state variable \"count\" with value 0 and a function \"setCount\" to update it.".to_string(),
            created_at: Some(now),
        },
        Snippet {
            id: "2".to_string(),
            title: "Python List Comprehension".to_string(),
            code: "squares = [x**2 for x in range(10) if x % 2 == 0]".to_string(),
            language: "python".to_string(),
            description: "Creating a list of squares of even numbers from 0 to 9".to_string(),
            tags: strings(&["list", "comprehension"]),
            ai_tags: strings(&["list", "loop", "algorithm"]),
            explanation: "This code creates a list of squares of all even numbers from 0 to 9 using Python's list comprehension syntax.".to_string(),
            created_at: Some(now),
        },
    ]
}
