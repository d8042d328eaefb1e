use crate::preset::preset_id::PresetId;

const COMMAND_MARKER: char = '/';
const PREFIX: &str = "vox";
const CONFIG_SUFFIX: &str = "config";
const HELP: &str = "vox_help";
const LIST_PRESETS: &str = "voxconfigls";
const LIST_VOICES: &str = "vox_list";

/// A recognised chat command.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// `/vox_help`
    Help,
    /// `/voxconfigls`
    ListPresets,
    /// `/vox_list`
    ListVoices,
    /// `/vox<N>config [key=value ...]`; `args` is `None` for a query.
    Configure { id: PresetId, args: Option<String> },
    /// `/vox<N> <text>`
    Synthesize { id: PresetId, text: String },
}

type Matcher = fn(&str) -> Option<Command>;

/// Tried in order, first match wins.
const MATCHERS: [Matcher; 5] = [
    match_help,
    match_list_presets,
    match_list_voices,
    match_configure,
    match_synthesize,
];

impl Command {
    /// Classify a raw chat line. Lines that are not commands yield `None`.
    ///
    /// The leading `/` is optional and command words are matched without regard to case.
    #[tracing::instrument(name = "parse_command", skip_all)]
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let body = line.strip_prefix(COMMAND_MARKER).unwrap_or(line);
        MATCHERS.iter().find_map(|matcher| matcher(body))
    }
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

fn first_word_is(body: &str, name: &str) -> bool {
    body.split(char::is_whitespace)
        .next()
        .is_some_and(|word| word.eq_ignore_ascii_case(name))
}

fn match_help(body: &str) -> Option<Command> {
    first_word_is(body, HELP).then_some(Command::Help)
}

fn match_list_presets(body: &str) -> Option<Command> {
    first_word_is(body, LIST_PRESETS).then_some(Command::ListPresets)
}

fn match_list_voices(body: &str) -> Option<Command> {
    first_word_is(body, LIST_VOICES).then_some(Command::ListVoices)
}

/// Split `vox<digits><rest>` into the preset id and the rest.
fn split_numbered(body: &str) -> Option<(PresetId, &str)> {
    let rest = strip_prefix_ignore_case(body, PREFIX)?;
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let id = rest[..digits].parse().ok()?;
    Some((id, &rest[digits..]))
}

fn match_configure(body: &str) -> Option<Command> {
    let (id, tail) = split_numbered(body)?;
    let after = strip_prefix_ignore_case(tail, CONFIG_SUFFIX)?;

    let args = if after.is_empty() {
        None
    } else if after.starts_with(char::is_whitespace) {
        Some(after.trim()).filter(|a| !a.is_empty()).map(str::to_string)
    } else {
        return None;
    };

    Some(Command::Configure { id, args })
}

fn match_synthesize(body: &str) -> Option<Command> {
    let (id, tail) = split_numbered(body)?;
    if !tail.starts_with(char::is_whitespace) {
        return None;
    }

    let text = tail.trim_start();
    if text.is_empty() {
        return None;
    }

    Some(Command::Synthesize {
        id,
        text: text.to_string(),
    })
}
