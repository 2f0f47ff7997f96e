//! Prompt templates for every council stage

use crate::orchestration::value_objects::{
    CarriedResponse, CritiqueRecord, ModelResponse, RoundRecord,
};
use crate::ranking::{Label, RANKING_MARKER};

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// Ranking prompt shown to every critic (stage 2)
    pub fn ranking_prompt(question: &str, responses: &[(Label, &str)]) -> String {
        let responses_text = responses
            .iter()
            .map(|(label, content)| format!("{}:\n{}", label, content))
            .collect::<Vec<_>>()
            .join("\n\n");

        format!(
            r#"You are evaluating different responses to the following question:

Question: {question}

Here are the responses from different models (anonymized):

{responses_text}

Your task:
1. First, evaluate each response individually. For each response, explain what it does well and what it does poorly.
2. Then, at the very end of your response, provide a final ranking.

IMPORTANT: Your final ranking MUST be formatted EXACTLY as follows:
- Start with the line "{marker}" (all caps, with colon)
- Then list the responses from best to worst as a numbered list
- Each line should be: number, period, space, then ONLY the response label (e.g., "1. Response A")
- Do not add any other text or explanations in the ranking section

Example of the correct format for your ENTIRE response:

Response A provides good detail on X but misses Y...
Response B is accurate but lacks depth on Z...
Response C offers the most comprehensive answer...

{marker}
1. Response C
2. Response A
3. Response B

Now provide your evaluation and ranking:"#,
            marker = RANKING_MARKER,
        )
    }

    /// Reasoning-quality ranking prompt; `reasoning` is `None` for answers without a trace
    pub fn reasoning_ranking_prompt(
        question: &str,
        responses: &[(Label, Option<String>, &str)],
    ) -> String {
        let responses_text = responses
            .iter()
            .map(|(label, reasoning, answer)| {
                format!(
                    "{}:\nReasoning: {}\nAnswer: {}",
                    label,
                    reasoning.as_deref().unwrap_or("No explicit reasoning provided"),
                    answer
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        format!(
            r#"You are evaluating the REASONING QUALITY of different responses to this question:

Question: {question}

{responses_text}

Evaluate based on:
1. Logical coherence and structure of the reasoning
2. Depth and thoroughness of analysis
3. Identification of key considerations
4. Rigor of argumentation
5. Clarity of reasoning steps

IMPORTANT: Your final ranking MUST be formatted EXACTLY as follows:
- Start with "{marker}" (all caps, with colon)
- Then list responses from best to worst as a numbered list
- Each line: number, period, space, then ONLY the response label (e.g., "1. Response A")

Now provide your evaluation and ranking:"#,
            marker = RANKING_MARKER,
        )
    }

    /// Answer-quality ranking prompt used alongside the reasoning pass
    pub fn answer_ranking_prompt(question: &str, responses: &[(Label, &str)]) -> String {
        let responses_text = responses
            .iter()
            .map(|(label, content)| format!("{}:\n{}", label, content))
            .collect::<Vec<_>>()
            .join("\n\n");

        format!(
            r#"You are evaluating different responses to the following question:

Question: {question}

Here are the responses (anonymized):

{responses_text}

Evaluate based on accuracy, completeness, clarity, and usefulness.

{marker} (list from best to worst as "1. Response X")
"#,
            marker = RANKING_MARKER,
        )
    }

    /// Chairman prompt over one round of answers and critiques (stage 3)
    pub fn synthesis_prompt(
        question: &str,
        responses: &[ModelResponse],
        critiques: &[CritiqueRecord],
    ) -> String {
        let stage1_text = responses
            .iter()
            .map(|r| format!("Model: {}\nResponse: {}", r.model, r.content))
            .collect::<Vec<_>>()
            .join("\n\n");

        let stage2_text = critiques
            .iter()
            .map(|c| format!("Model: {}\nRanking: {}", c.critic, c.raw_text))
            .collect::<Vec<_>>()
            .join("\n\n");

        format!(
            r#"You are the Chairman of an LLM Council. Multiple AI models have provided responses to a user's question, and then ranked each other's responses.

Original Question: {question}

STAGE 1 - Individual Responses:
{stage1_text}

STAGE 2 - Peer Rankings:
{stage2_text}

Your task as Chairman is to synthesize all of this information into a single, comprehensive, accurate answer to the user's original question. Consider:
- The individual responses and their insights
- The peer rankings and what they reveal about response quality
- Any patterns of agreement or disagreement

Provide a clear, well-reasoned final answer that represents the council's collective wisdom:"#
        )
    }

    /// Prompt asking a member to revise its answer after seeing the top of the last round
    pub fn revision_prompt(
        question: &str,
        carried: &[CarriedResponse],
        round_number: usize,
    ) -> String {
        let top_text = carried
            .iter()
            .map(|c| {
                format!(
                    "Response from {} (Avg Rank: {}):\n{}\n\nPeer critique excerpt: {}",
                    c.model, c.mean_rank, c.content, c.critique_excerpt
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        format!(
            r#"Original question: {question}

This is Round {round_number} of a multi-round deliberation. In the previous round, the top-ranked responses were:

{top_text}

Based on these top responses and their insights, please provide your revised response to the original question.

You may:
- Strengthen your original answer by incorporating valid points from the top responses
- Change your approach if you find their reasoning more compelling
- Maintain your original position if you believe it's still the best approach

Provide your revised answer:"#
        )
    }

    /// Chairman prompt over the full history of a multi-round run
    pub fn multi_round_synthesis_prompt(question: &str, rounds: &[RoundRecord]) -> String {
        let mut evolution_text = String::new();
        for round in rounds {
            evolution_text.push_str(&format!("\n\n=== ROUND {} ===\n", round.round_number));
            for response in &round.responses {
                evolution_text.push_str(&format!(
                    "\nModel: {}\nResponse: {}\n",
                    response.model, response.content
                ));
            }
            evolution_text.push_str(&format!(
                "\nAggregate Rankings (Round {}):\n",
                round.round_number
            ));
            for score in &round.aggregate {
                evolution_text.push_str(&format!(
                    "- {}: Avg Rank {}\n",
                    score.model, score.mean_rank
                ));
            }
        }

        format!(
            r#"You are the Chairman of an LLM Council conducting multi-round deliberation.

Original Question: {question}

The council has completed {count} rounds of deliberation. Here is the evolution:

{evolution_text}

Your task as Chairman is to synthesize the final answer, considering:
- How responses evolved across rounds
- Which insights emerged or strengthened over time
- The final rankings after deliberation
- Any convergence or divergence in thinking

Provide a comprehensive final answer that represents the council's collective wisdom after deliberation:"#,
            count = rounds.len(),
        )
    }

    /// Chairman prompt for the reasoning-aware strategy
    pub fn reasoning_synthesis_prompt(
        question: &str,
        responses: &[ModelResponse],
        critiques: &[CritiqueRecord],
        has_reasoning: bool,
    ) -> String {
        let stage1_text = responses
            .iter()
            .map(|r| match r.reasoning_text().filter(|_| has_reasoning) {
                Some(reasoning) => format!(
                    "Model: {}\nReasoning: {}\nAnswer: {}",
                    r.model, reasoning, r.content
                ),
                None => format!("Model: {}\nAnswer: {}", r.model, r.content),
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        let stage2_text = critiques
            .iter()
            .map(|c| format!("Model: {}\nEvaluation: {}", c.critic, c.raw_text))
            .collect::<Vec<_>>()
            .join("\n\n");

        let trace_note = if has_reasoning {
            " (with reasoning traces)"
        } else {
            ""
        };

        format!(
            r#"You are the Chairman of an LLM Council. Multiple AI models have provided responses, some with explicit reasoning traces.

Original Question: {question}

STAGE 1 - Responses{trace_note}:
{stage1_text}

STAGE 2 - Peer Evaluations:
{stage2_text}

Your task: Synthesize a final answer that:
- Leverages the best reasoning steps from the responses
- Provides a clear, accurate answer
- Acknowledges different approaches where relevant

Provide the final answer:"#
        )
    }

    /// Prompt for a short conversation title
    pub fn title_prompt(question: &str) -> String {
        format!(
            r#"Generate a very short title (3-5 words maximum) that summarizes the following question.
The title should be concise and descriptive. Do not use quotes or punctuation in the title.

Question: {question}

Title:"#
        )
    }
}
