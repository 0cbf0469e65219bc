//! Turns an asset schema into the ordered list of questions asked on the
//! terminal.

use crate::codec::{FieldKind, Schema};

/// Name of the confirm question that follows every repeated group.
pub const ASK_AGAIN: &str = "askAgain";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    /// Free-form text answer.
    Input,
    /// Yes/no answer.
    Confirm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub kind: QuestionKind,
    pub name: String,
    pub message: String,
}

impl Question {
    pub fn input(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: QuestionKind::Input,
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn confirm(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: QuestionKind::Confirm,
            name: name.into(),
            message: message.into(),
        }
    }
}

/// `name(sub1, sub2, ...)`
fn group_label(name: &str, nested: &Schema) -> String {
    let subfields: Vec<&str> = nested.fields().iter().map(|f| f.name.as_str()).collect();
    format!("{name}({})", subfields.join(", "))
}

/// Questions for every field of `schema`, in field order.
///
/// A repeated group yields an input followed by an [`ASK_AGAIN`] confirm;
/// every other field yields exactly one input.
pub fn generate_questions(schema: &Schema) -> Vec<Question> {
    let mut questions = Vec::with_capacity(schema.fields().len());
    for field in schema.fields() {
        let name = field.name.as_str();
        match &field.kind {
            FieldKind::Scalar(_) => {
                questions.push(Question::input(name, format!("Please enter: {name}: ")));
            }
            FieldKind::Array(_) => questions.push(Question::input(
                name,
                format!("Please enter: {name}(comma separated values (a,b)): "),
            )),
            FieldKind::Object(nested) => questions.push(Question::input(
                name,
                format!("Please enter: {}: ", group_label(name, nested)),
            )),
            FieldKind::ObjectArray(nested) => {
                let label = group_label(name, nested);
                questions.push(Question::input(name, format!("Please enter: {label}: ")));
                questions.push(Question::confirm(
                    ASK_AGAIN,
                    format!("Want to enter another {label}"),
                ));
            }
        }
    }
    questions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::builtin;

    #[test]
    fn transfer_questions_follow_field_order() {
        let questions = generate_questions(&builtin::token_transfer_schema());
        let messages: Vec<_> = questions.iter().map(|q| q.message.as_str()).collect();
        assert_eq!(
            messages,
            [
                "Please enter: amount: ",
                "Please enter: recipientAddress: ",
                "Please enter: data: ",
            ]
        );
        assert!(questions.iter().all(|q| q.kind == QuestionKind::Input));
    }

    #[test]
    fn repeated_group_is_followed_by_confirm() {
        let questions = generate_questions(&builtin::dpos_vote_schema());
        assert_eq!(
            questions,
            [
                Question::input("votes", "Please enter: votes(delegateAddress, amount): "),
                Question::confirm(ASK_AGAIN, "Want to enter another votes(delegateAddress, amount)"),
            ]
        );
    }

    #[test]
    fn scalar_arrays_ask_for_comma_separated_values() {
        let questions = generate_questions(&builtin::keys_register_schema());
        assert_eq!(questions.len(), 3);
        assert_eq!(
            questions[1].message,
            "Please enter: mandatoryKeys(comma separated values (a,b)): "
        );
    }

    #[test]
    fn single_nested_object_has_no_confirm() {
        let questions = generate_questions(&builtin::account_schema());
        let token = questions.iter().find(|q| q.name == "token").unwrap();
        assert_eq!(token.message, "Please enter: token(balance): ");
        assert!(questions.iter().all(|q| q.name != ASK_AGAIN));
    }
}
