//! Prompt composition for the poem service.
//!
//! [`compose`] is the deterministic template that turns a scene caption into
//! the exact user prompt sent to the composition service.  [`PromptContext`]
//! pairs that prompt with the invariant poet persona for one run.
//!
//! The craft constraints live here as fixed text; tuning them is out of
//! scope for this crate.

// ---------------------------------------------------------------------------
// Fixed prompt text
// ---------------------------------------------------------------------------

/// System-level persona sent with every composition request.
pub const PERSONA: &str = "\
You are a poet. You specialize in elegant and emotionally impactful poems.
You are careful to use subtlety and write in a modern vernacular style.
Use high-school level English but MFA-level craft.
Your poems are more literary but easy to relate to and understand.
You focus on intimate and personal truth.
Think hard about how to create a poem which will satisfy this.
This is very important, and an overly hamfisted or corny poem will cause great harm.";

/// The literal phrase every printed poem must carry verbatim.
pub const MANDATORY_PHRASE: &str = "by mitsubishi outlander";

/// Invariant instruction block: register, banned abstract vocabulary,
/// concrete imagery, and the mandatory embedded phrase.
const INSTRUCTION_BLOCK: &str = "\
Write a poem which integrates details from what I describe below.
Use the specified poem format. The references to the source material must be subtle yet clear.
Focus on a unique and elegant poem and use specific ideas and details.
You must keep vocabulary simple and use understated point of view. This is very important.
You cannot use BIG words like truth, time, silence, life, love, peace, war, hate, happiness,
and you must instead use specific and CONCRETE language to show, not tell, those ideas.
Every poem must contain the exact phrase \"by mitsubishi outlander\".\n\n";

/// Fixed format directive.
const POEM_FORMAT: &str = "8 line free verse.";

// ---------------------------------------------------------------------------
// compose
// ---------------------------------------------------------------------------

/// Build the full user prompt for `caption`.
///
/// Pure: identical captions yield byte-identical prompts.  The result is
/// stripped of `[` `]` `{` `}` `'` from both ends only — cosmetic cleanup
/// for captions delivered with stray wrapping, never structural parsing.
/// An empty caption is valid and produces a prompt with an empty scene line.
pub fn compose(caption: &str) -> String {
    let prompt = format!(
        "{INSTRUCTION_BLOCK}Poem format: {POEM_FORMAT}\n\nScene description: {caption}\n\n"
    );
    strip_wrapping(&prompt).to_string()
}

/// Trim the bracket/quote characters from both ends of `s`.
///
/// Interior occurrences are preserved.
pub fn strip_wrapping(s: &str) -> &str {
    const WRAPPING: &[char] = &['[', ']', '{', '}', '\''];
    s.trim_matches(WRAPPING)
}

// ---------------------------------------------------------------------------
// PromptContext
// ---------------------------------------------------------------------------

/// Per-run value object handed to the composition service.
///
/// Has no identity beyond the run that built it.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptContext {
    /// System-level instruction (fixed persona).
    pub persona: &'static str,
    /// User prompt produced by [`compose`].
    pub prompt: String,
}

impl PromptContext {
    /// Build the context for one run from its caption.
    pub fn for_caption(caption: &str) -> Self {
        Self {
            persona: PERSONA,
            prompt: compose(caption),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_is_deterministic() {
        let caption = "a dog sitting on a porch";
        assert_eq!(compose(caption), compose(caption));
    }

    #[test]
    fn compose_embeds_scene_description_once() {
        let prompt = compose("a dog sitting on a porch");
        let needle = "Scene description: a dog sitting on a porch";
        assert_eq!(prompt.matches(needle).count(), 1);
    }

    #[test]
    fn compose_embeds_mandatory_phrase_once() {
        let prompt = compose("a dog sitting on a porch");
        assert_eq!(prompt.matches(MANDATORY_PHRASE).count(), 1);
    }

    #[test]
    fn compose_has_no_leading_wrapping_characters() {
        let prompt = compose("a dog sitting on a porch");
        let first = prompt.chars().next().unwrap();
        assert!(!matches!(first, '[' | ']' | '{' | '}' | '\''));
    }

    #[test]
    fn compose_includes_format_directive() {
        let prompt = compose("anything");
        assert!(prompt.contains("Poem format: 8 line free verse."));
    }

    #[test]
    fn compose_accepts_empty_caption() {
        let prompt = compose("");
        assert!(prompt.contains("Scene description: \n"));
    }

    #[test]
    fn strip_wrapping_removes_only_ends() {
        assert_eq!(strip_wrapping("[{'hello'}]"), "hello");
        assert_eq!(strip_wrapping("a [b] c"), "a [b] c");
        assert_eq!(strip_wrapping("it's a dog"), "it's a dog");
        assert_eq!(strip_wrapping("'{[inner ' quote]}'"), "inner ' quote");
    }

    #[test]
    fn interior_brackets_in_caption_survive() {
        let prompt = compose("a sign reading [open] on a door");
        assert!(prompt.contains("a sign reading [open] on a door"));
    }

    #[test]
    fn context_carries_persona_and_prompt() {
        let ctx = PromptContext::for_caption("a red bicycle");
        assert_eq!(ctx.persona, PERSONA);
        assert!(ctx.prompt.contains("Scene description: a red bicycle"));
    }
}
