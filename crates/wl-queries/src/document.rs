//! Condition document
//!
//! The editable, caller-owned list of conditions behind the filter builder.
//! Every edit goes through the field metadata table, so the document never
//! holds an operator the field does not accept or a value of the wrong shape.
//! The list always keeps at least one condition.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::compiler::compile;
use crate::conditions::{
    validate_operator, validate_value, Condition, ConditionError, ConditionValue, Logic,
};
use crate::fields::Field;
use crate::operators::Operator;

/// Errors raised by document edits
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("condition {0} not found")]
    NotFound(String),

    #[error("the last remaining condition cannot be removed")]
    LastCondition,

    #[error(transparent)]
    Condition(#[from] ConditionError),
}

pub type DocumentResult<T> = Result<T, DocumentError>;

/// Ordered, non-empty list of conditions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Condition>", into = "Vec<Condition>")]
pub struct ConditionList {
    conditions: Vec<Condition>,
}

impl Default for ConditionList {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<Condition>> for ConditionList {
    fn from(conditions: Vec<Condition>) -> Self {
        let mut list = Self::new();
        list.replace(conditions);
        list
    }
}

impl From<ConditionList> for Vec<Condition> {
    fn from(list: ConditionList) -> Self {
        list.conditions
    }
}

impl ConditionList {
    /// A document holding one empty condition
    pub fn new() -> Self {
        Self {
            conditions: vec![Condition::empty()],
        }
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Whether the document has no conditions
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Condition> {
        self.conditions.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Condition> {
        self.conditions.iter().find(|c| c.id == id)
    }

    /// Append an empty condition and return its id
    pub fn add(&mut self) -> String {
        let condition = Condition::empty();
        let id = condition.id.clone();
        self.conditions.push(condition);
        id
    }

    /// Append an existing condition
    pub fn push(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }

    pub fn remove(&mut self, id: &str) -> DocumentResult<Condition> {
        let idx = self.position(id)?;
        if self.conditions.len() == 1 {
            return Err(DocumentError::LastCondition);
        }
        Ok(self.conditions.remove(idx))
    }

    /// Switch field; operator and value reset to the field's defaults
    pub fn set_field(&mut self, id: &str, field: Field) -> DocumentResult<()> {
        let condition = self.condition_mut(id)?;
        condition.field = field;
        condition.operator = field.default_operator();
        condition.value = ConditionValue::empty_for(field);
        Ok(())
    }

    pub fn set_operator(&mut self, id: &str, operator: Operator) -> DocumentResult<()> {
        let condition = self.condition_mut(id)?;
        validate_operator(condition.field, operator)?;
        condition.operator = operator;
        Ok(())
    }

    pub fn set_value(&mut self, id: &str, value: ConditionValue) -> DocumentResult<()> {
        let condition = self.condition_mut(id)?;
        validate_value(condition.field, &value)?;
        condition.value = value;
        Ok(())
    }

    /// Add one value, turning a non-empty scalar into a list first
    pub fn push_value(&mut self, id: &str, value: impl Into<String>) -> DocumentResult<()> {
        let condition = self.condition_mut(id)?;
        if !condition.field.value_shape().accepts_list() {
            return Err(ConditionError::ValueShape {
                field: condition.field,
                expected: "single",
            }
            .into());
        }

        let value = value.into();
        condition.value = match std::mem::take(&mut condition.value) {
            ConditionValue::List(mut items) => {
                items.push(value);
                ConditionValue::List(items)
            }
            ConditionValue::Scalar(current) => {
                let mut items = Vec::with_capacity(2);
                if !current.is_empty() {
                    items.push(current);
                }
                items.push(value);
                ConditionValue::List(items)
            }
        };
        Ok(())
    }

    /// Remove every occurrence of a value from a list
    pub fn remove_value(&mut self, id: &str, value: &str) -> DocumentResult<()> {
        let condition = self.condition_mut(id)?;
        if let ConditionValue::List(items) = &mut condition.value {
            items.retain(|item| item != value);
        }
        Ok(())
    }

    /// Add several values, skipping ones already present
    pub fn merge_values<I, S>(&mut self, id: &str, values: I) -> DocumentResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for value in values {
            let value = value.into();
            let present = self
                .get(id)
                .and_then(|c| c.value.as_list())
                .is_some_and(|items| items.contains(&value));
            if !present {
                self.push_value(id, value)?;
            }
        }
        // Surface NotFound even when `values` was empty
        self.position(id).map(|_| ())
    }

    pub fn clear_value(&mut self, id: &str) -> DocumentResult<()> {
        let condition = self.condition_mut(id)?;
        condition.value = ConditionValue::empty_for(condition.field);
        Ok(())
    }

    pub fn set_logic(&mut self, id: &str, logic: Logic) -> DocumentResult<()> {
        self.condition_mut(id)?.logic = logic;
        Ok(())
    }

    /// Replace everything, e.g. after loading a filter or importing a query
    pub fn replace(&mut self, conditions: Vec<Condition>) {
        self.conditions = if conditions.is_empty() {
            vec![Condition::empty()]
        } else {
            conditions
        };
    }

    pub fn compile(&self) -> String {
        compile(&self.conditions)
    }

    fn position(&self, id: &str) -> DocumentResult<usize> {
        self.conditions
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| DocumentError::NotFound(id.to_string()))
    }

    fn condition_mut(&mut self, id: &str) -> DocumentResult<&mut Condition> {
        let idx = self.position(id)?;
        Ok(&mut self.conditions[idx])
    }
}

impl<'a> IntoIterator for &'a ConditionList {
    type Item = &'a Condition;
    type IntoIter = std::slice::Iter<'a, Condition>;

    fn into_iter(self) -> Self::IntoIter {
        self.conditions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_id(list: &ConditionList) -> String {
        list.conditions()[0].id.clone()
    }

    #[test]
    fn test_new_document_has_one_empty_condition() {
        let list = ConditionList::new();
        assert_eq!(list.len(), 1);
        assert_eq!(list.conditions()[0].field, Field::WorklogAuthor);
        assert_eq!(list.compile(), "");
    }

    #[test]
    fn test_add_and_remove() {
        let mut list = ConditionList::new();
        let first = first_id(&list);
        let second = list.add();
        assert_eq!(list.len(), 2);

        list.remove(&first).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list.remove(&second), Err(DocumentError::LastCondition));
        assert_eq!(
            list.remove("missing"),
            Err(DocumentError::NotFound("missing".to_string()))
        );
    }

    #[test]
    fn test_set_field_resets_operator_and_value() {
        let mut list = ConditionList::new();
        let id = first_id(&list);
        list.push_value(&id, "alice").unwrap();

        list.set_field(&id, Field::WorklogDate).unwrap();
        let condition = list.get(&id).unwrap();
        assert_eq!(condition.operator, Operator::GreaterThanOrEqual);
        assert_eq!(condition.value, ConditionValue::scalar(""));

        list.set_field(&id, Field::WorklogAuthor).unwrap();
        assert_eq!(list.get(&id).unwrap().value, ConditionValue::List(vec![]));
    }

    #[test]
    fn test_set_operator_is_validated() {
        let mut list = ConditionList::new();
        let id = first_id(&list);

        list.set_operator(&id, Operator::NotIn).unwrap();
        let err = list.set_operator(&id, Operator::Contains).unwrap_err();
        assert!(matches!(
            err,
            DocumentError::Condition(ConditionError::OperatorNotAllowed { .. })
        ));
        assert_eq!(list.get(&id).unwrap().operator, Operator::NotIn);
    }

    #[test]
    fn test_set_value_is_validated() {
        let mut list = ConditionList::new();
        let id = first_id(&list);
        assert!(list.set_value(&id, ConditionValue::scalar("alice")).is_err());
        list.set_value(&id, ConditionValue::list(["alice"])).unwrap();
        assert_eq!(list.compile(), r#"worklogAuthor in ("alice")"#);
    }

    #[test]
    fn test_push_value_promotes_scalar() {
        let mut list = ConditionList::new();
        let id = first_id(&list);
        list.set_field(&id, Field::Summary).unwrap();
        list.set_value(&id, ConditionValue::scalar("login")).unwrap();
        list.push_value(&id, "logout").unwrap();

        assert_eq!(
            list.get(&id).unwrap().value,
            ConditionValue::list(["login", "logout"])
        );
        assert_eq!(list.compile(), r#"(summary ~ "login" OR summary ~ "logout")"#);
    }

    #[test]
    fn test_push_value_on_empty_scalar() {
        let mut list = ConditionList::new();
        let id = first_id(&list);
        list.set_field(&id, Field::Key).unwrap();
        list.push_value(&id, "ABC-1").unwrap();
        assert_eq!(list.get(&id).unwrap().value, ConditionValue::list(["ABC-1"]));
    }

    #[test]
    fn test_push_value_rejected_for_scalar_fields() {
        let mut list = ConditionList::new();
        let id = first_id(&list);
        list.set_field(&id, Field::Custom).unwrap();
        assert!(list.push_value(&id, "status = Done").is_err());
    }

    #[test]
    fn test_merge_and_remove_values() {
        let mut list = ConditionList::new();
        let id = first_id(&list);
        list.merge_values(&id, ["alice", "bob"]).unwrap();
        list.merge_values(&id, ["bob", "carol"]).unwrap();
        assert_eq!(
            list.get(&id).unwrap().value,
            ConditionValue::list(["alice", "bob", "carol"])
        );

        list.remove_value(&id, "bob").unwrap();
        assert_eq!(list.get(&id).unwrap().value, ConditionValue::list(["alice", "carol"]));

        list.clear_value(&id).unwrap();
        assert_eq!(list.get(&id).unwrap().value, ConditionValue::List(vec![]));

        assert!(matches!(
            list.merge_values("missing", Vec::<String>::new()),
            Err(DocumentError::NotFound(_))
        ));
    }

    #[test]
    fn test_logic_and_compile() {
        let mut list = ConditionList::new();
        let first = first_id(&list);
        list.set_field(&first, Field::Project).unwrap();
        list.set_value(&first, ConditionValue::scalar("ABC")).unwrap();
        list.set_logic(&first, Logic::Or).unwrap();

        let second = list.add();
        list.set_field(&second, Field::Issuetype).unwrap();
        list.set_value(&second, ConditionValue::scalar("Bug")).unwrap();

        assert_eq!(list.compile(), r#"project = "ABC" OR issuetype = "Bug""#);
    }

    #[test]
    fn test_replace_keeps_one_condition() {
        let mut list = ConditionList::new();
        list.replace(vec![]);
        assert_eq!(list.len(), 1);
        assert!(!list.is_empty());

        list.replace(vec![Condition::custom("a = b"), Condition::custom("c = d")]);
        assert_eq!(list.len(), 2);
        assert_eq!(list.compile(), "a = b AND c = d");
    }

    #[test]
    fn test_serde_as_plain_array() {
        let list: ConditionList = serde_json::from_str("[]").unwrap();
        assert_eq!(list.len(), 1);

        let mut list = ConditionList::new();
        list.replace(vec![Condition::custom("x = 1")]);
        let json = serde_json::to_value(&list).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["field"], "custom");
    }
}
