//! Prompt assembly
//!
//! Builds the system/user instruction pair sent to the model. Output is a pure function of the
//! inputs; nothing is truncated.

use std::fmt;

use crate::domain::{DocumentSet, SourceFile};
use crate::registry::Format;

/// Instruction pair for one structured-generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptParts {
    pub system: String,
    pub user: String,
}

const SYSTEM_PROMPT: &str = "\
You are a context file conversion assistant. Your task is to convert the context and \
configuration files of one AI coding assistant into the format used by another.

You will be provided with:
- Documentation for the source format
- Documentation for the target format
- The path and content of every source file

Convert the source files to the target format based on the documentation provided. Ensure that:
- All relevant instructions, rules and settings are preserved
- The output follows the target format's syntax and conventions
- Format-specific features are adapted rather than dropped
- The converted files keep the same functional intent
- You output both the file path and the complete file content for every file

The conversion may produce one or several files depending on the target format. Prefer a single \
file unless the target format requires separating content. Paths must be relative to the project \
root.";

/// Assemble the prompt: source docs, then target docs, then source files.
pub fn build_prompt(
    from: Format,
    to: Format,
    source_docs: &DocumentSet,
    target_docs: &DocumentSet,
    files: &[SourceFile],
) -> PromptParts {
    let user = UserPrompt { from, to, source_docs, target_docs, files }.to_string();
    PromptParts { system: SYSTEM_PROMPT.to_string(), user }
}

struct UserPrompt<'a> {
    from: Format,
    to: Format,
    source_docs: &'a DocumentSet,
    target_docs: &'a DocumentSet,
    files: &'a [SourceFile],
}

impl fmt::Display for UserPrompt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (from, to) = (self.from.display_name(), self.to.display_name());
        writeln!(f, "Convert the following {from} context files to the {to} format.\n")?;

        writeln!(f, "Source format documentation ({from}):")?;
        write_documents(f, "source_docs", &self.source_docs.documents)?;

        writeln!(f, "\nTarget format documentation ({to}):")?;
        write_documents(f, "target_docs", &self.target_docs.documents)?;

        f.write_str("\nSource files:\n<source_files>\n")?;
        for file in self.files {
            writeln!(f, "<file path=\"{}\">\n{}\n</file>", file.path.display(), file.content)?;
        }
        f.write_str("</source_files>\n")?;

        write!(f, "\nOutput placement for {to}:\n{}\n", self.to.output_guidance())
    }
}

fn write_documents(f: &mut fmt::Formatter<'_>, tag: &str, documents: &[String]) -> fmt::Result {
    writeln!(f, "<{tag}>")?;
    for doc in documents {
        writeln!(f, "<document>\n{doc}\n</document>")?;
    }
    writeln!(f, "</{tag}>")
}
