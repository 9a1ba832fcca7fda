use regex::Regex;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Throw { content: String },
    Pick,
}

/// 由配置中的两条正则编译而来，启动后不再变化
///
/// 先检查扔漂流瓶，再检查捡漂流瓶。扔漂流瓶的内容按以下顺序提取：
/// 名为 `content` 的捕获组、第一个捕获组、正则开头的固定关键词之后的文本、整个匹配。
#[derive(Debug, Clone)]
pub struct CommandMatcher {
    throw: Regex,
    pick: Regex,
    throw_keyword: String,
}

impl CommandMatcher {
    pub fn new(throw_regex: &str, pick_regex: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            throw: Regex::new(throw_regex)?,
            pick: Regex::new(pick_regex)?,
            throw_keyword: leading_literal(throw_regex),
        })
    }

    /// `None` 表示不是漂流瓶命令
    pub fn classify(&self, text: &str) -> Option<Command> {
        if let Some(content) = self.throw_content(text) {
            return Some(Command::Throw { content });
        }
        self.pick.is_match(text).then_some(Command::Pick)
    }

    pub fn is_command(&self, text: &str) -> bool {
        self.throw.is_match(text) || self.pick.is_match(text)
    }

    fn throw_content(&self, text: &str) -> Option<String> {
        let caps = self.throw.captures(text)?;
        if self.throw.captures_len() > 1 {
            // 可选的捕获组没有参与匹配时视为空内容，交给后续的空内容检查
            let group = caps.name("content").or_else(|| caps.get(1));
            return Some(group.map(|m| m.as_str().to_owned()).unwrap_or_default());
        }
        let matched = caps.get(0)?.as_str();
        Some(matched.strip_prefix(self.throw_keyword.as_str()).unwrap_or(matched).to_owned())
    }
}

/// 正则开头的固定文本，遇到元字符或被量词修饰的字符即停止
fn leading_literal(pattern: &str) -> String {
    let mut literal = String::new();
    let mut chars = pattern.strip_prefix('^').unwrap_or(pattern).chars().peekable();
    while let Some(c) = chars.next() {
        let c = match c {
            '\\' => match chars.peek() {
                Some(&escaped) if escaped.is_ascii_punctuation() => {
                    chars.next();
                    escaped
                }
                _ => break,
            },
            '.' | '+' | '*' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '^' | '$' => break,
            c => c,
        };
        if matches!(chars.peek(), Some('?' | '*' | '+' | '{')) {
            break;
        }
        literal.push(c);
    }
    literal
}
