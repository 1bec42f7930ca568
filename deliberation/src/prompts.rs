//! Prompt text for both deliberation strategies.
//!
//! Phase instructions are ephemeral: they are sent for one call and never
//! persisted into the conversation (see `Responder::send`).

use crate::persona::Roster;

/// Decision token an inspection must emit to trigger early finalization.
///
/// Matched as a case-sensitive exact substring; this is intentionally
/// stricter than answer extraction, which is case-insensitive.
pub const DECISION_FINALIZE: &str = "Decision: FINALIZE";

/// Final answer used when a panel exhausts its budget with nothing
/// extractable to vote on.
pub const NO_CONCLUSIVE_ANSWER: &str = "No conclusive answer reached";

const IDENTIFY_BRIEF: &str = r#"Assess task difficulty and evaluate the potential challenges in solving it, providing key points to consider based on specifically difficult factors. Avoid directly solving the problem or adhering to the final task response format.

When assessing difficulty, ensure the following:
- Take a deep breath and figure out what your task is. Do not go beyond the task.
- Be humble and honest about the complexity, as the task might be challenging.
- Clearly highlight critical factors or considerations that could impact the resolution of the task.
- Avoid general terms and provide specific details that are relevant to the instance at hand."#;

const IDENTIFY_FORMAT: &str = r#"Format:

IDENTIFICATION
Task for this instance: (One line summary)
Overall Complexity: Easy / Medium / Hard

Key Notices:
1. ...
2. ...
...

Guidance:
Step 1: ...
Step 2: ...
..."#;

const IMPROVISE_BRIEF: &str = r#"Plan a set of reasonable steps to solve the problem based on the task's difficulty and key considerations, and arrive at the **final answer**. When presenting the final answer, ensure it adheres to the required response format.

Guidelines for the process:
- Take a deep breath and figure out what your task is. Do not go beyond the task.
- Focus on improving the accuracy of the final answer; the thought process is a means to that end.
- Avoid excessive focus on minor, unimportant details and prioritize elements that directly enhance the accuracy of the final answer.
- Base reasoning and conclusions on known information, avoiding speculation on unknowns.

Ensure the final answer is presented clearly, without further explanation or elaboration."#;

const IMPROVISE_FORMAT: &str = r#"Format:

IMPROVISATION
Let's come up with a specific solution for this very instance!
Task for this instance: (in one line)
I should notice: (keys from previous identification, one line)

Steps:
1.
2.
3.
...

Final Answer:
...
(your final answer formatted according to task description)"#;

const RE_IMPROVISE_BRIEF: &str = r#"Review and refine the problem-solving steps and the final answer with the aim of enhancing the accuracy of the final result. Trust your intuition and avoid unnecessary doubt.

Guidelines for the review:
- Take a deep breath and figure out what your task is. Do not go beyond the task.
- Focus on ensuring the final answer is as accurate and reliable as possible.
- Correct possible mistakes in task description, reasoning chain, or final answer (format and content).
- Avoid overthinking or second-guessing unnecessarily; make calm decisions based on the given information.
- Do not critique for the sake of critique; if the solution is sound, acknowledge it.
- Offer a refined solution."#;

const RE_IMPROVISE_FORMAT: &str = r#"Format:

RE-IMPROVISATION
Let's refine the specific solution for this very instance!
Task for this instance: (in one line)
I should notice: (keys from all previous steps, in one line)

Steps:
1.
2.
3.
...

Final Answer:
...
(your final answer formatted according to task description)"#;

const INSPECT_BRIEF: &str = r#"Carefully review and analyze the current problem-solving process and final answer, identifying potential issues in the reasoning or approach.

Guidelines for the review:
- Take a deep breath and figure out what your task is. Do not go beyond the task.
- Focus on improving the accuracy of the final answer; refining the reasoning process is a means to this goal.
- Avoid overanalyzing minor or irrelevant details, directing attention toward elements that significantly impact the final answer's accuracy.
- Ground observations and critiques in the known information, refraining from speculation about unknown factors.
- Do not critique for the sake of critique; if the solution is sound, acknowledge it.

After your analysis, decide whether to:
1. FINALIZE - if the solution is sound and ready for final output
2. REFINE - if the solution needs further improvement

End your response with either "Decision: FINALIZE" or "Decision: REFINE""#;

const INSPECT_FORMAT: &str = r#"Format:

INSPECTION
Analysis:

On reasoning chain:
1.
2.
3.
...

On final answer:
1.
2.
3.
...

Decision: [FINALIZE/REFINE]"#;

const FINALIZE_BRIEF: &str = r#"Carefully review and analyze the current problem-solving process and final answer; make one last improvement to address potential issues and arrive at the **final answer**.

Guidelines for this review and improvement:
- Take a deep breath and figure out what your task is. Do not go beyond the task.
- Ensure your response concords with the task requirements and adheres to the specified format.
- Focus solely on improving the accuracy and reliability of the final answer.
- Treat the refinement of the reasoning process as a means to achieve higher accuracy in the final result.
- Avoid over-focusing on trivial details, directing effort toward addressing critical issues that impact the final answer's correctness.

Conclude with the final answer clearly and concisely, ensuring it is presented without additional elaboration or explanation."#;

const FINALIZE_FORMAT: &str = r#"Format:

FINAL SOLUTION

1.
2.
3.
...

Final Answer:
(your final answer formatted according to task description)"#;

/// Instruction for the Identify phase (Re-Identify reuses the same brief).
pub fn identify(first_pass: bool) -> String {
    let verb = if first_pass { "IDENTIFY" } else { "RE-IDENTIFY" };
    format!("Now please {verb}.\n{IDENTIFY_BRIEF}\n{IDENTIFY_FORMAT}")
}

/// Instruction for the Improvise phase; refinement passes get the
/// review-oriented brief instead.
pub fn improvise(first_pass: bool) -> String {
    if first_pass {
        format!("Now please IMPROVISE.\n{IMPROVISE_BRIEF}\n{IMPROVISE_FORMAT}")
    } else {
        format!("Now please RE-IMPROVISE.\n{RE_IMPROVISE_BRIEF}\n{RE_IMPROVISE_FORMAT}")
    }
}

/// Instruction for the Inspect phase (Re-Inspect reuses the same brief).
pub fn inspect(first_pass: bool) -> String {
    let verb = if first_pass { "INSPECT" } else { "RE-INSPECT" };
    format!("Now please {verb}.\n{INSPECT_BRIEF}\n{INSPECT_FORMAT}")
}

/// Instruction for the one-and-only Finalize call.
pub fn finalize() -> String {
    format!("Now please FINALIZE.\n{FINALIZE_BRIEF}\n{FINALIZE_FORMAT}")
}

/// Roster introduction shared by every panel system prompt.
pub fn roster_preamble(roster: &Roster) -> String {
    format!(
        "There are {} scientist agents to solve a tabular reasoning task: {}.",
        roster.len(),
        roster.roll_call()
    )
}

/// Closing system instruction of every discussion-round call.
pub const DISCUSSION_INSTRUCTION: &str = "Now considering all of your previous initiatives, \
     please: 1) give out your own step-by-step solution while responding to fellows' \
     initiatives; 2) give out your final answer. Keep in a scientist's confronting manner \
     and make your final answer polished. Notice that you are not required to always reach \
     a consensus. Use structured free form with a fixed format: \n Final Answer:\n \n at \
     the end of your response, with no other content attached.";

/// System notice appended to the shared history before each reflection round.
pub const DISAGREEMENT_NOTICE: &str = "There are still disagreements among the scientist \
     agents. Please discuss further to reach a consensus.";
