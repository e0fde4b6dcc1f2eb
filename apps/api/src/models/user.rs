use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, FromRow)]
pub struct UsageRow {
    pub generations: i32,
    pub generations_used_this_month: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    pub generations: i32,
    pub generations_used_this_month: i32,
    pub remaining: i32,
}

impl From<UsageRow> for Usage {
    fn from(row: UsageRow) -> Self {
        Usage {
            generations: row.generations,
            generations_used_this_month: row.generations_used_this_month,
            remaining: (row.generations - row.generations_used_this_month).max(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining_never_negative() {
        let usage = Usage::from(UsageRow {
            generations: 10,
            generations_used_this_month: 12,
        });
        assert_eq!(usage.remaining, 0);

        let usage = Usage::from(UsageRow {
            generations: 10,
            generations_used_this_month: 3,
        });
        assert_eq!(usage.remaining, 7);
    }

    #[test]
    fn test_usage_serializes_camel_case() {
        let json = serde_json::to_value(Usage {
            generations: 10,
            generations_used_this_month: 1,
            remaining: 9,
        })
        .unwrap();
        assert_eq!(json["generationsUsedThisMonth"], 1);
        assert_eq!(json["remaining"], 9);
    }
}
