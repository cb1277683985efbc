//! Invalidation command wire codec.
//!
//! Commands travel over the queue as newline-separated tokens: the
//! first line is the verb, the remaining lines are positional operands.
//! Parsing happens once at the queue boundary and produces a fully
//! typed [`Command`] or a [`CommandError`] - never a partially
//! populated value. Query operands are normalized here so that
//! membership keys always use canonical form.

use thiserror::Error;

use crate::query::{normalize, NormalizedQuery};

/// Errors produced while decoding a queue message into a [`Command`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The verb is not one we know. Skipped rather than dropped loudly,
    /// so newer producers can introduce verbs without stalling older
    /// consumers.
    #[error("unknown verb: {0}")]
    UnknownVerb(String),
    #[error("{verb} command is missing the {operand} operand")]
    MissingOperand {
        verb: &'static str,
        operand: &'static str,
    },
    #[error("empty message body")]
    Empty,
}

/// Result type for command decoding.
pub type Result<T> = std::result::Result<T, CommandError>;

/// Target of a `delete` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteScope {
    /// Remove every membership set and aggregate cache for the user.
    All,
    /// Remove one query from the user's overall set and the named
    /// category's set.
    Category {
        category: String,
        query: NormalizedQuery,
    },
}

/// A typed invalidation command, one variant per wire verb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Delete {
        user_id: String,
        scope: DeleteScope,
    },
    Create {
        user_id: String,
        category: Option<String>,
        query: NormalizedQuery,
    },
    Refresh {
        user_id: String,
    },
    Update {
        user_id: String,
        old_category: String,
        old_query: NormalizedQuery,
        new_category: String,
        new_query: NormalizedQuery,
    },
    CleanGlobal {
        user_id: String,
        query: String,
    },
    CleanNamed {
        user_id: String,
        name: String,
        query: String,
    },
}

impl Command {
    /// Decodes a queue message body.
    pub fn parse(body: &str) -> Result<Command> {
        let mut lines = body.lines();
        let verb = match lines.next() {
            Some(v) if !v.is_empty() => v,
            _ => return Err(CommandError::Empty),
        };

        match verb {
            "delete" => {
                let user_id = operand(&mut lines, "delete", "user id")?;
                let category = operand(&mut lines, "delete", "category")?;
                if category == "all" {
                    Ok(Command::Delete {
                        user_id,
                        scope: DeleteScope::All,
                    })
                } else {
                    let query = operand(&mut lines, "delete", "query")?;
                    Ok(Command::Delete {
                        user_id,
                        scope: DeleteScope::Category {
                            category,
                            query: normalize(&query),
                        },
                    })
                }
            }
            "create" => {
                let user_id = operand(&mut lines, "create", "user id")?;
                let category = operand(&mut lines, "create", "category")?;
                let query = operand(&mut lines, "create", "query")?;
                Ok(Command::Create {
                    user_id,
                    category: (!category.is_empty()).then_some(category),
                    query: normalize(&query),
                })
            }
            "refresh" => {
                let user_id = operand(&mut lines, "refresh", "user id")?;
                Ok(Command::Refresh { user_id })
            }
            "update" => {
                let user_id = operand(&mut lines, "update", "user id")?;
                let old_category = operand(&mut lines, "update", "old category")?;
                let old_query = operand(&mut lines, "update", "old query")?;
                let new_category = operand(&mut lines, "update", "new category")?;
                let new_query = operand(&mut lines, "update", "new query")?;
                Ok(Command::Update {
                    user_id,
                    old_category,
                    old_query: normalize(&old_query),
                    new_category,
                    new_query: normalize(&new_query),
                })
            }
            "clean global" => {
                let user_id = operand(&mut lines, "clean global", "user id")?;
                let query = operand(&mut lines, "clean global", "query")?;
                Ok(Command::CleanGlobal { user_id, query })
            }
            "clean named" => {
                let user_id = operand(&mut lines, "clean named", "user id")?;
                let name = operand(&mut lines, "clean named", "list name")?;
                let query = operand(&mut lines, "clean named", "query")?;
                Ok(Command::CleanNamed {
                    user_id,
                    name,
                    query,
                })
            }
            other => Err(CommandError::UnknownVerb(other.to_string())),
        }
    }

    /// Renders the command back into its wire form.
    pub fn encode(&self) -> String {
        match self {
            Command::Delete {
                user_id,
                scope: DeleteScope::All,
            } => format!("delete\n{user_id}\nall"),
            Command::Delete {
                user_id,
                scope: DeleteScope::Category { category, query },
            } => format!("delete\n{user_id}\n{category}\n{query}"),
            Command::Create {
                user_id,
                category,
                query,
            } => format!(
                "create\n{user_id}\n{}\n{query}",
                category.as_deref().unwrap_or("")
            ),
            Command::Refresh { user_id } => format!("refresh\n{user_id}"),
            Command::Update {
                user_id,
                old_category,
                old_query,
                new_category,
                new_query,
            } => format!("update\n{user_id}\n{old_category}\n{old_query}\n{new_category}\n{new_query}"),
            Command::CleanGlobal { user_id, query } => {
                format!("clean global\n{user_id}\n{query}")
            }
            Command::CleanNamed {
                user_id,
                name,
                query,
            } => format!("clean named\n{user_id}\n{name}\n{query}"),
        }
    }
}

fn operand(
    lines: &mut std::str::Lines<'_>,
    verb: &'static str,
    name: &'static str,
) -> Result<String> {
    lines
        .next()
        .map(str::to_string)
        .ok_or(CommandError::MissingOperand {
            verb,
            operand: name,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_delete_all() {
        let command = Command::parse("delete\n1\nall").unwrap();
        assert_eq!(
            command,
            Command::Delete {
                user_id: "1".to_string(),
                scope: DeleteScope::All,
            }
        );
    }

    #[test]
    fn test_parse_delete_category_normalizes_query() {
        let command = Command::parse("delete\n1\nfav\nCat  Dog").unwrap();
        assert_eq!(
            command,
            Command::Delete {
                user_id: "1".to_string(),
                scope: DeleteScope::Category {
                    category: "fav".to_string(),
                    query: normalize("cat dog"),
                },
            }
        );
    }

    #[test]
    fn test_parse_create() {
        let command = Command::parse("create\n1\nfav\ncat dog").unwrap();
        assert_eq!(
            command,
            Command::Create {
                user_id: "1".to_string(),
                category: Some("fav".to_string()),
                query: normalize("cat dog"),
            }
        );
    }

    #[test]
    fn test_parse_create_without_category() {
        let command = Command::parse("create\n1\n\ncat dog").unwrap();
        assert_eq!(
            command,
            Command::Create {
                user_id: "1".to_string(),
                category: None,
                query: normalize("cat dog"),
            }
        );
    }

    #[test]
    fn test_parse_refresh() {
        let command = Command::parse("refresh\n42").unwrap();
        assert_eq!(
            command,
            Command::Refresh {
                user_id: "42".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_update() {
        let command = Command::parse("update\n1\nfav\ncat dog\nfav\ncat").unwrap();
        assert_eq!(
            command,
            Command::Update {
                user_id: "1".to_string(),
                old_category: "fav".to_string(),
                old_query: normalize("cat dog"),
                new_category: "fav".to_string(),
                new_query: normalize("cat"),
            }
        );
    }

    #[test]
    fn test_parse_clean_verbs() {
        let global = Command::parse("clean global\n1\ncat dog").unwrap();
        assert_eq!(
            global,
            Command::CleanGlobal {
                user_id: "1".to_string(),
                query: "cat dog".to_string(),
            }
        );

        let named = Command::parse("clean named\n1\nfav\ncat dog").unwrap();
        assert_eq!(
            named,
            Command::CleanNamed {
                user_id: "1".to_string(),
                name: "fav".to_string(),
                query: "cat dog".to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_verb() {
        assert_eq!(
            Command::parse("purge\n1"),
            Err(CommandError::UnknownVerb("purge".to_string()))
        );
    }

    #[test]
    fn test_empty_body() {
        assert_eq!(Command::parse(""), Err(CommandError::Empty));
        assert_eq!(Command::parse("\n1"), Err(CommandError::Empty));
    }

    #[test]
    fn test_missing_operand() {
        assert_eq!(
            Command::parse("refresh"),
            Err(CommandError::MissingOperand {
                verb: "refresh",
                operand: "user id",
            })
        );
        assert_eq!(
            Command::parse("clean named\n1\nfav"),
            Err(CommandError::MissingOperand {
                verb: "clean named",
                operand: "query",
            })
        );
    }

    #[test]
    fn test_encode_round_trip() {
        let commands = [
            Command::parse("delete\n1\nall").unwrap(),
            Command::parse("delete\n1\nfav\ncat dog").unwrap(),
            Command::parse("create\n1\nfav\ncat dog").unwrap(),
            Command::parse("create\n1\n\ncat").unwrap(),
            Command::parse("refresh\n1").unwrap(),
            Command::parse("update\n1\nfav\ncat dog\nfav\ncat").unwrap(),
            Command::parse("clean global\n1\ncat dog").unwrap(),
            Command::parse("clean named\n1\nfav\ncat dog").unwrap(),
        ];

        for command in commands {
            assert_eq!(Command::parse(&command.encode()).unwrap(), command);
        }
    }
}
