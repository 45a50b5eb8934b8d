use std::collections::BTreeMap;

use crate::predicate;
use crate::responses::ResponseStore;
use crate::spec::Survey;

/// Question id to visibility, in id order.
pub type VisibilityMap = BTreeMap<String, bool>;

/// Whether the question at `index` is currently shown.
///
/// Out-of-range indices are never visible. Skip logic whose antecedent is not
/// a strictly earlier question evaluates to hidden, so visibility of question
/// `k` depends only on answers to questions before `k`.
pub fn is_visible(survey: &Survey, index: usize, responses: &ResponseStore) -> bool {
    let Some(question) = survey.question(index) else {
        return false;
    };
    let Some(logic) = &question.skip_logic else {
        return true;
    };

    let antecedent_is_earlier = survey.questions[..index]
        .iter()
        .any(|earlier| earlier.id == logic.field_id);
    if !antecedent_is_earlier {
        tracing::debug!(
            question_id = %question.id,
            field_id = %logic.field_id,
            "skip logic does not reference an earlier question, hiding"
        );
        return false;
    }

    predicate::evaluate(logic, responses)
}

/// First visible index at or after `index`.
pub fn first_visible_from(
    survey: &Survey,
    index: usize,
    responses: &ResponseStore,
) -> Option<usize> {
    let found = (index..survey.len()).find(|&candidate| is_visible(survey, candidate, responses));
    tracing::trace!(from = index, ?found, "forward visibility scan");
    found
}

/// Last visible index strictly before `index`.
pub fn last_visible_before(
    survey: &Survey,
    index: usize,
    responses: &ResponseStore,
) -> Option<usize> {
    let upper = index.min(survey.len());
    let found = (0..upper)
        .rev()
        .find(|&candidate| is_visible(survey, candidate, responses));
    tracing::trace!(before = index, ?found, "backward visibility scan");
    found
}

/// All currently visible indices in presentation order.
pub fn visible_indices(survey: &Survey, responses: &ResponseStore) -> Vec<usize> {
    (0..survey.len())
        .filter(|&index| is_visible(survey, index, responses))
        .collect()
}

pub fn resolve_visibility(survey: &Survey, responses: &ResponseStore) -> VisibilityMap {
    survey
        .questions
        .iter()
        .enumerate()
        .map(|(index, question)| (question.id.clone(), is_visible(survey, index, responses)))
        .collect()
}
