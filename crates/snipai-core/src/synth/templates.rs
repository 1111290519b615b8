//! Code-body templates for synthesized web results.
//!
//! One [`TemplateVariant`] is chosen per result from the target's language
//! and [`CodeSignals`]; each variant renders a pure function of its
//! [`TemplateContext`].

use once_cell::sync::Lazy;
use regex::Regex;

static TITLE_PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_\s]").expect("valid regex"));

/// Coarse traits of the target code that steer template selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CodeSignals {
    pub is_async: bool,
    pub is_ui: bool,
    pub has_iteration: bool,
}

impl CodeSignals {
    pub fn detect(code: &str) -> Self {
        Self {
            is_async: ["async", "await", "Promise"].iter().any(|p| code.contains(p)),
            is_ui: ["React", "useState", "Component"]
                .iter()
                .any(|p| code.contains(p)),
            has_iteration: ["for ", "while", "forEach", "map("]
                .iter()
                .any(|p| code.contains(p)),
        }
    }
}

/// Values interpolated into a template.
#[derive(Debug, Clone)]
pub struct TemplateContext<'a> {
    /// Human label of the result's site, e.g. `Stack Overflow`.
    pub source_type: &'a str,
    /// Raw result title.
    pub title: &'a str,
    /// Target snippet language as stored.
    pub language: &'a str,
    pub primary: &'a str,
    pub secondary: &'a str,
    pub signals: CodeSignals,
}

impl TemplateContext<'_> {
    fn clean_title(&self) -> String {
        TITLE_PUNCTUATION.replace_all(self.title, "").into_owned()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateVariant {
    JsComponent,
    JsAsync,
    JsPlain,
    PyAsync,
    PyIteration,
    PyPlain,
    Html,
    Css,
    Generic,
}

impl TemplateVariant {
    pub fn select(language: &str, signals: CodeSignals) -> Self {
        match language.to_lowercase().as_str() {
            "javascript" if signals.is_ui => Self::JsComponent,
            "javascript" if signals.is_async => Self::JsAsync,
            "javascript" => Self::JsPlain,
            "python" if signals.is_async => Self::PyAsync,
            "python" if signals.has_iteration => Self::PyIteration,
            "python" => Self::PyPlain,
            "html" => Self::Html,
            "css" => Self::Css,
            _ => Self::Generic,
        }
    }

    pub fn render(self, ctx: &TemplateContext<'_>) -> String {
        match self {
            Self::JsComponent => js_component(ctx),
            Self::JsAsync => js_async(ctx),
            Self::JsPlain => js_plain(ctx),
            Self::PyAsync => py_async(ctx),
            Self::PyIteration => py_iteration(ctx),
            Self::PyPlain => py_plain(ctx),
            Self::Html => html(ctx),
            Self::Css => css(ctx),
            Self::Generic => generic(ctx),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn js_component(ctx: &TemplateContext<'_>) -> String {
    let source = ctx.source_type;
    let component = capitalize(ctx.primary);
    let handler = capitalize(ctx.secondary);
    let endpoint = ctx.primary.to_lowercase();
    let primary = ctx.primary;
    let (effect_import, effect_block) = if ctx.signals.is_async {
        (
            ", useEffect",
            format!(
                r#"
  useEffect(() => {{
    // Fetch data when component mounts
    const fetchData = async () => {{
      try {{
        const response = await fetch('/api/{endpoint}');
        const data = await response.json();
        setState(data);
      }} catch (error) {{
        console.error('Error fetching data:', error);
      }}
    }};
    
    fetchData();
  }}, []);"#
            ),
        )
    } else {
        ("", String::new())
    };

    format!(
        r#"// React component from {source}
import React, {{ useState{effect_import} }} from 'react';

function {component}(props) {{
  const [state, setState] = useState(null);
  {effect_block}
  
  const handle{handler} = () => {{
    setState(prevState => !prevState);
  }};

  return (
    <div className="{primary}-container">
      <h2>{{props.title || '{component}'}}</h2>
      <button onClick={{handle{handler}}}>
        Toggle State
      </button>
      {{state && <p>State is active</p>}}
    </div>
  );
}}

export default {component};"#
    )
}

fn js_async(ctx: &TemplateContext<'_>) -> String {
    let source = ctx.source_type;
    let title = ctx.clean_title();
    let primary = ctx.primary;
    let endpoint = ctx.primary.to_lowercase();
    let body = if ctx.signals.has_iteration {
        r#"data.map(item => {
      return {
        ...item,
        processed: true,
        timestamp: new Date().toISOString()
      };
    })"#
    } else {
        r#"{
      ...data,
      processed: true,
      timestamp: new Date().toISOString()
    }"#
    };

    format!(
        r#"// Async function from {source}
/**
 * {title}
 * @param {{string}} id - The identifier to process
 * @returns {{Promise<Object>}} The processed data
 */
async function {primary}(id) {{
  try {{
    const response = await fetch(`/api/{endpoint}/${{id}}`);
    
    if (!response.ok) {{
      throw new Error(`Error: ${{response.status}}`);
    }}
    
    const data = await response.json();
    return {body};
  }} catch (error) {{
    console.error('Failed to fetch data:', error);
    throw error;
  }}
}}"#
    )
}

fn js_plain(ctx: &TemplateContext<'_>) -> String {
    let source = ctx.source_type;
    let title = ctx.clean_title();
    let primary = ctx.primary;
    let body = if ctx.signals.has_iteration {
        r#"return data.filter(item => item !== null)
    .map(item => {
      // Process each item
      return {
        ...item,
        processed: true,
        timestamp: new Date().toISOString()
      };
    })"#
    } else {
        r#"const result = {
    original: data,
    processed: true,
    count: data.length,
    timestamp: new Date().toISOString()
  };
  
  return result;"#
    };

    format!(
        r#"// Function from {source}
/**
 * {title}
 * @param {{Array}} data - The input data to process
 * @returns {{Array}} The processed data
 */
function {primary}(data) {{
  if (!Array.isArray(data)) {{
    throw new TypeError('Input must be an array');
  }}
  
  {body}
}}"#
    )
}

fn py_async(ctx: &TemplateContext<'_>) -> String {
    let source = ctx.source_type;
    let title = ctx.clean_title();
    let primary = ctx.primary;
    let secondary = ctx.secondary;
    let body = if ctx.signals.has_iteration {
        r#"# Process the results
                    results = []
                    for item in data:
                        if item is not None:
                            item["processed"] = True
                            results.append(item)
                    return results"#
    } else {
        r#"# Process the data
                    data["processed"] = True
                    data["timestamp"] = datetime.now().isoformat()
                    return data"#
    };

    format!(
        r#"# Async function from {source}
import asyncio
import aiohttp

async def {primary}({secondary}_id):
    """
    {title}
    
    Args:
        {secondary}_id: The ID to process
        
    Returns:
        dict: The processed data
    """
    async with aiohttp.ClientSession() as session:
        try:
            async with session.get(f"https://api.example.com/{{{secondary}_id}}") as response:
                if response.status == 200:
                    data = await response.json()
                    {body}
                else:
                    raise Exception(f"API returned status code {{response.status}}")
        except Exception as e:
            print(f"Error processing request: {{e}}")
            return None"#
    )
}

fn py_iteration(ctx: &TemplateContext<'_>) -> String {
    let source = ctx.source_type;
    let title = ctx.clean_title();
    let primary = ctx.primary;

    format!(
        r#"# Function from {source}
def {primary}(data_list):
    """
    {title}
    
    Args:
        data_list: List of items to process
        
    Returns:
        list: Processed items
    """
    if not isinstance(data_list, list):
        raise TypeError("Input must be a list")
    
    results = []
    for item in data_list:
        # Skip None values
        if item is None:
            continue
            
        # Process each item
        processed_item = {{
            "original": item,
            "processed": True,
            "hash": hash(str(item))
        }}
        results.append(processed_item)
        
    return results"#
    )
}

fn py_plain(ctx: &TemplateContext<'_>) -> String {
    let source = ctx.source_type;
    let title = ctx.clean_title();
    let primary = ctx.primary;
    let secondary = ctx.secondary;

    format!(
        r#"# Function from {source}
def {primary}({secondary}):
    """
    {title}
    
    Args:
        {secondary}: The input to process
        
    Returns:
        dict: The processed output
    """
    try:
        # Input validation
        if not {secondary}:
            return None
            
        # Process the input
        result = {{
            "input": {secondary},
            "processed": True,
            "type": type({secondary}).__name__,
            "length": len({secondary}) if hasattr({secondary}, "__len__") else 0
        }}
        
        return result
    except Exception as e:
        print(f"Error in {primary}: {{e}}")
        return None"#
    )
}

fn html(ctx: &TemplateContext<'_>) -> String {
    let source = ctx.source_type;
    let title = ctx.clean_title();
    let primary = ctx.primary.to_lowercase();
    let secondary = ctx.secondary.to_lowercase();

    format!(
        r#"<!-- HTML structure from {source} -->
<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{title}</title>
  <style>
    .{primary}-container {{
      padding: 20px;
      margin: 10px;
      border: 1px solid #ddd;
      border-radius: 4px;
    }}
    .{secondary}-item {{
      margin-bottom: 10px;
    }}
  </style>
</head>
<body>
  <div class="{primary}-container">
    <h2>{title}</h2>
    <div class="{secondary}-item">
      <p>This is an example from {source}</p>
      <button id="{primary}-btn">Click Me</button>
    </div>
  </div>
  
  <script>
    document.getElementById('{primary}-btn').addEventListener('click', function() {{
      alert('Button clicked!');
    }});
  </script>
</body>
</html>"#
    )
}

fn css(ctx: &TemplateContext<'_>) -> String {
    let source = ctx.source_type;
    let primary = ctx.primary.to_lowercase();
    let secondary = ctx.secondary.to_lowercase();

    format!(
        r#"/* CSS styles from {source} */
.{primary}-container {{
  display: flex;
  flex-direction: column;
  padding: 20px;
  margin: 15px;
  background-color: #f5f5f5;
  border-radius: 4px;
  box-shadow: 0 2px 4px rgba(0, 0, 0, 0.1);
}}

.{primary}-header {{
  font-size: 24px;
  color: #333;
  margin-bottom: 15px;
  padding-bottom: 10px;
  border-bottom: 1px solid #ddd;
}}

.{secondary}-item {{
  padding: 10px;
  margin-bottom: 10px;
  background-color: white;
  border-left: 3px solid #2962ff;
}}

@media (max-width: 768px) {{
  .{primary}-container {{
    padding: 10px;
    margin: 10px;
  }}
  
  .{primary}-header {{
    font-size: 20px;
  }}
}}"#
    )
}

fn generic(ctx: &TemplateContext<'_>) -> String {
    let source = ctx.source_type;
    let title = ctx.title;
    let language = ctx.language;
    let primary = ctx.primary;
    let secondary = ctx.secondary;

    format!(
        r#"// Code from {source} for {language}
// Related to: {title}

/**
 * {primary} function implementation
 * This is a sample code snippet that would be extracted from the web page
 * In a production environment, this would be actual code parsed from the page
 */
function {primary}() {{
  // Implementation would be extracted from the web page
  console.log("This is a sample implementation");
  
  // Example relevant to search query
  const {secondary} = {{
    id: 123,
    name: "Example",
    process: function() {{
      // Processing logic would be here
      return true;
    }}
  }};
  
  return {secondary};
}}"#
    )
}
