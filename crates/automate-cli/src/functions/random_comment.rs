//! Comment on a random object

use async_trait::async_trait;
use automate_core::objects::flatten_base;
use automate_core::runner::AutomateFunction;
use automate_core::{AutomateError, AutomateResult, AutomationContext, FunctionInputs};
use automate_rules::try_get_display_value;
use rand::seq::SliceRandom;
use schemars::JsonSchema;
use serde::Deserialize;

pub(crate) const NO_DISPLAYABLE_OBJECTS: &str = "Automation failed: No displayable objects found.";

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentInputs {
    /// This phrase will be added to a random model element.
    #[schemars(title = "Comment Phrase")]
    pub comment_phrase: String,
}

impl FunctionInputs for CommentInputs {
    fn validate(&self) -> AutomateResult<()> {
        if self.comment_phrase.trim().is_empty() {
            return Err(AutomateError::invalid_input_field(
                "comment phrase must not be empty",
                "commentPhrase",
            ));
        }
        Ok(())
    }
}

pub struct RandomComment;

#[async_trait]
impl AutomateFunction for RandomComment {
    type Inputs = CommentInputs;

    fn name(&self) -> &'static str {
        "random-comment"
    }

    fn description(&self) -> &'static str {
        "Attach a comment to one random displayable object"
    }

    async fn run(&self, context: &mut AutomationContext, inputs: CommentInputs) -> AutomateResult<()> {
        let root = context.receive_version().await?;
        let displayable: Vec<&str> = flatten_base(&root)
            .into_iter()
            .filter(|object| try_get_display_value(object).is_some())
            .filter_map(|object| object.id())
            .collect();

        let chosen = displayable.choose(&mut rand::thread_rng()).copied();
        match chosen {
            None => context.mark_run_failed(NO_DISPLAYABLE_OBJECTS),
            Some(id) => {
                context.attach_info_to_objects("Selected Object", [id], inputs.comment_phrase)?;
                context.mark_run_success("Added a comment to a random object.");
            }
        }

        context.set_context_view(Vec::<String>::new(), true)?;
        Ok(())
    }
}
