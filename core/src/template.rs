//! Path templates: `{{ }}` actions substituted from a serializable record.
//!
//! # Design
//! A template is parsed once into text and action nodes, then executed
//! against data converted to a `serde_json::Value`. Actions hold a pipeline
//! of commands separated by `|`; each command is either an operand (a field
//! reference such as `.UserID`, the whole record `.`, or a literal) or a call
//! to a function from a [`Funcs`] registry. The output of one command is
//! passed as the last argument of the next call, so `{{ .Text | URLEncode }}`
//! and `{{ URLEncode .Text }}` are equivalent.
//!
//! Function names are resolved while parsing, so a reference to an unknown
//! function is a parse error rather than an execution error. Field lookups
//! happen during execution.
//!
//! Supported syntax:
//! - `{{ pipeline }}`: evaluate and write the textual value
//! - `{{- ` / ` -}}`: trim whitespace before / after the action
//! - `{{/* comment */}}`: produces no output
//! - literals: `"quoted"` with `\"`, `\\`, `\n`, `\t`, `\r` escapes,
//!   `` `raw` ``, integers, floats, `true`, `false`, `nil`

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::encode::url_encode;
use crate::error::{Error, ParseError, Result};

const LEFT_DELIM: &str = "{{";
const RIGHT_DELIM: &str = "}}";
const RIGHT_TRIM: &str = "-}}";

/// A named template function. Functions take exactly one argument.
pub type Filter = fn(&Value) -> String;

/// Registry of functions callable from a template.
#[derive(Clone)]
pub struct Funcs {
    entries: BTreeMap<String, Filter>,
}

impl Funcs {
    /// A registry with no functions at all.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Register `filter` under `name`, replacing any previous entry.
    pub fn insert(&mut self, name: impl Into<String>, filter: Filter) -> &mut Self {
        self.entries.insert(name.into(), filter);
        self
    }

    pub fn get(&self, name: &str) -> Option<Filter> {
        self.entries.get(name).copied()
    }
}

impl Default for Funcs {
    /// The standard registry: `URLEncode`.
    fn default() -> Self {
        let mut funcs = Self::empty();
        funcs.insert("URLEncode", |value| url_encode(render(value)));
        funcs
    }
}

impl fmt::Debug for Funcs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

/// Parse `template` with the standard functions and execute it against
/// `data`.
///
/// ```
/// use serde_json::json;
///
/// let url = requests::substitute(
///     "http://x/{{.UserID}}/{{.Text|URLEncode}}",
///     &json!({ "UserID": 123, "Text": "Hello, World!" }),
/// )
/// .unwrap();
/// assert_eq!(url, "http://x/123/Hello%2C%20World%21");
/// ```
pub fn substitute<T: Serialize + ?Sized>(template: &str, data: &T) -> Result<String> {
    let output = Template::parse(template)?.execute(data)?;
    tracing::trace!(template, output = %output, "substituted path template");
    Ok(output)
}

/// A parsed template, reusable across executions.
#[derive(Debug, Clone)]
pub struct Template {
    nodes: Vec<Node>,
}

impl Template {
    /// Parse with the standard function registry.
    pub fn parse(source: &str) -> Result<Self> {
        Self::parse_with(source, &Funcs::default())
    }

    pub fn parse_with(source: &str, funcs: &Funcs) -> Result<Self> {
        let nodes = Parser {
            src: source,
            pos: 0,
            funcs,
        }
        .parse()?;
        Ok(Self { nodes })
    }

    /// Render the template with `data`, which must serialize to a structure
    /// whose fields the template references by name.
    pub fn execute<T: Serialize + ?Sized>(&self, data: &T) -> Result<String> {
        let root = serde_json::to_value(data)
            .map_err(|e| Error::Execution(format!("data cannot be serialized: {e}")))?;
        let mut out = String::new();
        for node in &self.nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Action(pipeline) => out.push_str(&render(&pipeline.evaluate(&root)?)),
            }
        }
        Ok(out)
    }
}

/// Textual form of a value as written into the output.
///
/// Floats with no fractional part print without a trailing `.0` (`1.0`
/// renders as `1`) up to 1e15; beyond that and for other numbers the JSON
/// form is used.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "<nil>".to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{f:.0}"),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "nil",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Debug, Clone)]
enum Node {
    Text(String),
    Action(Pipeline),
}

#[derive(Debug, Clone)]
struct Pipeline {
    commands: Vec<Command>,
}

#[derive(Debug, Clone)]
enum Command {
    Operand(Operand),
    Call {
        name: String,
        filter: Filter,
        args: Vec<Operand>,
    },
}

#[derive(Debug, Clone)]
enum Operand {
    Dot,
    Field(Vec<String>),
    Literal(Value),
}

impl Pipeline {
    fn evaluate(&self, root: &Value) -> Result<Value> {
        let mut previous: Option<Value> = None;
        for command in &self.commands {
            let value = match command {
                Command::Operand(operand) => operand.resolve(root)?,
                Command::Call { name, filter, args } => {
                    let mut values = args
                        .iter()
                        .map(|arg| arg.resolve(root))
                        .collect::<Result<Vec<_>>>()?;
                    values.extend(previous.take());
                    match values.as_slice() {
                        [value] => Value::String(filter(value)),
                        _ => {
                            return Err(Error::Execution(format!(
                                "wrong number of args for {name}: want 1 got {}",
                                values.len()
                            )))
                        }
                    }
                }
            };
            previous = Some(value);
        }
        Ok(previous.unwrap_or(Value::Null))
    }
}

impl Operand {
    fn resolve(&self, root: &Value) -> Result<Value> {
        match self {
            Operand::Dot => Ok(root.clone()),
            Operand::Literal(value) => Ok(value.clone()),
            Operand::Field(path) => {
                let mut current = root;
                for name in path {
                    current = match current {
                        Value::Object(map) => map.get(name).ok_or_else(|| {
                            Error::Execution(format!("field {name:?} not found in data"))
                        })?,
                        other => {
                            return Err(Error::Execution(format!(
                                "can't evaluate field {name:?} in type {}",
                                type_name(other)
                            )))
                        }
                    };
                }
                Ok(current.clone())
            }
        }
    }
}

/// Lexical items inside an action, other than `|`.
#[derive(Debug)]
enum Atom {
    Dot,
    Field(Vec<String>),
    Literal(Value),
    Ident(String),
}

enum Token {
    Pipe,
    Atom(Atom),
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    funcs: &'a Funcs,
}

impl<'a> Parser<'a> {
    fn parse(mut self) -> Result<Vec<Node>> {
        let mut nodes = Vec::new();
        let mut trim_leading = false;
        loop {
            let rest = self.rest();
            let Some(open) = rest.find(LEFT_DELIM) else {
                let text = if trim_leading { rest.trim_start() } else { rest };
                push_text(&mut nodes, text);
                return Ok(nodes);
            };

            let open_offset = self.pos + open;
            let mut text = &rest[..open];
            self.pos = open_offset + LEFT_DELIM.len();
            if self.at_left_trim() {
                self.pos += 1;
                text = text.trim_end();
            }
            if trim_leading {
                text = text.trim_start();
            }
            push_text(&mut nodes, text);

            let (pipeline, trim_trailing) = self.action(open_offset)?;
            nodes.extend(pipeline.map(Node::Action));
            trim_leading = trim_trailing;
        }
    }

    fn rest(&self) -> &'a str {
        let src = self.src;
        &src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> Error {
        ParseError::Template {
            offset,
            message: message.into(),
        }
        .into()
    }

    /// `{{-` only trims when followed by whitespace, so `{{-3}}` stays a number.
    fn at_left_trim(&self) -> bool {
        let mut chars = self.rest().chars();
        chars.next() == Some('-') && chars.next().is_some_and(char::is_whitespace)
    }

    fn skip_whitespace(&mut self) -> bool {
        let rest = self.rest();
        let trimmed = rest.trim_start();
        self.pos += rest.len() - trimmed.len();
        rest.len() != trimmed.len()
    }

    /// Consume a closing delimiter if one is next, reporting whether it trims.
    fn close(&mut self, after_space: bool) -> Option<bool> {
        if self.rest().starts_with(RIGHT_DELIM) {
            self.pos += RIGHT_DELIM.len();
            Some(false)
        } else if after_space && self.rest().starts_with(RIGHT_TRIM) {
            self.pos += RIGHT_TRIM.len();
            Some(true)
        } else {
            None
        }
    }

    /// Parse one action whose `{{` sits at `open`. Comments yield no pipeline.
    fn action(&mut self, open: usize) -> Result<(Option<Pipeline>, bool)> {
        self.skip_whitespace();
        if self.rest().starts_with("/*") {
            let Some(end) = self.rest().find("*/") else {
                return Err(self.error(open, "unclosed comment"));
            };
            self.pos += end + 2;
            let after_space = self.skip_whitespace();
            return match self.close(after_space) {
                Some(trim) => Ok((None, trim)),
                None => Err(self.error(self.pos, "comment ends before closing delimiter")),
            };
        }

        let mut segments: Vec<Vec<(usize, Atom)>> = vec![Vec::new()];
        let mut pipes = Vec::new();
        let trim = loop {
            let after_space = self.skip_whitespace();
            if let Some(trim) = self.close(after_space) {
                break trim;
            }
            let offset = self.pos;
            match self.token(open)? {
                Token::Pipe => {
                    pipes.push(offset);
                    segments.push(Vec::new());
                }
                Token::Atom(atom) => {
                    if let Some(segment) = segments.last_mut() {
                        segment.push((offset, atom));
                    }
                }
            }
        };

        if pipes.is_empty() && segments.iter().all(Vec::is_empty) {
            return Err(self.error(open, "missing value for command"));
        }
        let mut commands = Vec::with_capacity(segments.len());
        for (index, segment) in segments.into_iter().enumerate() {
            // An empty segment sits next to the pipe before or after it.
            let pipe_offset = pipes.get(index).or(pipes.last()).copied().unwrap_or(open);
            commands.push(self.command(pipe_offset, segment, index == 0)?);
        }
        Ok((Some(Pipeline { commands }), trim))
    }

    fn command(&self, pipe_offset: usize, segment: Vec<(usize, Atom)>, first: bool) -> Result<Command> {
        let mut atoms = segment.into_iter();
        let Some((offset, head)) = atoms.next() else {
            return Err(self.error(pipe_offset, "missing command around '|'"));
        };
        match head {
            Atom::Ident(name) => {
                let Some(filter) = self.funcs.get(&name) else {
                    return Err(self.error(offset, format!("function {name:?} not defined")));
                };
                let args = atoms
                    .map(|(offset, atom)| self.operand(offset, atom))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Command::Call { name, filter, args })
            }
            atom => {
                if !first {
                    return Err(self.error(offset, "non-function command in pipeline"));
                }
                if let Some((extra, _)) = atoms.next() {
                    return Err(self.error(extra, "can't give argument to non-function"));
                }
                self.operand(offset, atom).map(Command::Operand)
            }
        }
    }

    fn operand(&self, offset: usize, atom: Atom) -> Result<Operand> {
        match atom {
            Atom::Dot => Ok(Operand::Dot),
            Atom::Field(path) => Ok(Operand::Field(path)),
            Atom::Literal(value) => Ok(Operand::Literal(value)),
            Atom::Ident(name) => Err(self.error(
                offset,
                format!("function {name:?} used as an argument; nested calls need a pipeline"),
            )),
        }
    }

    fn token(&mut self, open: usize) -> Result<Token> {
        let offset = self.pos;
        let Some(c) = self.peek() else {
            return Err(self.error(open, "unclosed action"));
        };
        let atom = match c {
            '|' => {
                self.pos += 1;
                return Ok(Token::Pipe);
            }
            '"' => Atom::Literal(Value::String(self.quoted()?)),
            '`' => Atom::Literal(Value::String(self.raw()?)),
            '.' => self.field()?,
            '-' | '+' | '0'..='9' => Atom::Literal(self.number()?),
            c if c.is_alphabetic() || c == '_' => match self.ident() {
                "true" => Atom::Literal(Value::Bool(true)),
                "false" => Atom::Literal(Value::Bool(false)),
                "nil" => Atom::Literal(Value::Null),
                name => Atom::Ident(name.to_string()),
            },
            c => return Err(self.error(offset, format!("unexpected {c:?} in action"))),
        };
        Ok(Token::Atom(atom))
    }

    fn ident(&mut self) -> &'a str {
        let rest = self.rest();
        let len = rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    fn field(&mut self) -> Result<Atom> {
        let offset = self.pos;
        let mut path = Vec::new();
        while self.peek() == Some('.') {
            self.pos += 1;
            let name = self.ident();
            if name.is_empty() {
                if path.is_empty() && self.peek() != Some('.') {
                    return Ok(Atom::Dot);
                }
                return Err(self.error(offset, "bad field reference"));
            }
            path.push(name.to_string());
        }
        Ok(Atom::Field(path))
    }

    fn quoted(&mut self) -> Result<String> {
        let offset = self.pos;
        let mut out = String::new();
        let mut chars = self.rest().char_indices().skip(1);
        while let Some((i, c)) = chars.next() {
            match c {
                '"' => {
                    self.pos += i + 1;
                    return Ok(out);
                }
                '\\' => {
                    let escaped = match chars.next() {
                        Some((_, 'n')) => '\n',
                        Some((_, 't')) => '\t',
                        Some((_, 'r')) => '\r',
                        Some((_, '\\')) => '\\',
                        Some((_, '"')) => '"',
                        Some((j, other)) => {
                            return Err(self.error(offset + j, format!("unknown escape \\{other}")))
                        }
                        None => break,
                    };
                    out.push(escaped);
                }
                '\n' => break,
                c => out.push(c),
            }
        }
        Err(self.error(offset, "unterminated quoted string"))
    }

    fn raw(&mut self) -> Result<String> {
        let offset = self.pos;
        let body = &self.rest()[1..];
        let Some(end) = body.find('`') else {
            return Err(self.error(offset, "unterminated raw string"));
        };
        self.pos += end + 2;
        Ok(body[..end].to_string())
    }

    fn number(&mut self) -> Result<Value> {
        let offset = self.pos;
        let rest = self.rest();
        let sign = usize::from(rest.starts_with(['-', '+']));
        let len = sign
            + rest[sign..]
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '.'))
                .unwrap_or(rest.len() - sign);
        let text = &rest[..len];
        self.pos += len;

        let digits = text.strip_prefix('+').unwrap_or(text);
        if let Ok(n) = digits.parse::<i64>() {
            return Ok(Value::from(n));
        }
        if let Ok(n) = digits.parse::<u64>() {
            return Ok(Value::from(n));
        }
        digits
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| self.error(offset, format!("bad number syntax: {text:?}")))
    }
}

fn push_text(nodes: &mut Vec<Node>, text: &str) {
    if !text.is_empty() {
        nodes.push(Node::Text(text.to_string()));
    }
}
