//! Распознавание табличных массивов.
//!
//! Массив из двух и более map с одинаковым набором строковых ключей и
//! примитивными значениями кодируется как расширение типа -1: имена колонок
//! пишутся один раз, строки идут подряд без повторения ключей.
//!
//! Если хотя бы одна проверка не проходит, массив кодируется обычным образом.
//! Это не ошибка, а лишь упущенная оптимизация.

use std::fmt;

use tracing::trace;

use crate::Value;

/// Минимальное число строк, при котором таблица имеет смысл.
pub const MIN_TABLE_ROWS: usize = 2;

/// Табличное представление массива map.
///
/// Заимствует имена колонок и ячейки из исходного дерева: кодировщик владеет
/// деревом только на чтение.
#[derive(Debug, Clone, PartialEq)]
pub struct Table<'a> {
    columns: Vec<&'a str>,
    /// Ячейки построчно, `rows * columns.len()` элементов.
    cells: Vec<&'a Value>,
    rows: usize,
}

impl<'a> Table<'a> {
    /// Имена колонок в порядке ключей первой строки.
    pub fn columns(&self) -> &[&'a str] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Ячейки построчно (row-major).
    pub fn cells(&self) -> &[&'a Value] {
        &self.cells
    }
}

/// Причина, по которой массив не стал таблицей.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Меньше [`MIN_TABLE_ROWS`] элементов.
    TooFewRows(usize),
    /// Элемент `row` не является map.
    NotAMap { row: usize },
    /// Ключ в строке `row` не строка.
    NonStringKey { row: usize },
    /// Ключ повторяется в первой строке.
    DuplicateColumn(String),
    /// Набор ключей строки `row` отличается от первой строки.
    KeyMismatch { row: usize },
    /// Значение колонки `column` в строке `row` — массив или map.
    NestedValue { row: usize, column: String },
}

impl fmt::Display for Rejection {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::TooFewRows(n) => write!(f, "{n} rows, need at least {MIN_TABLE_ROWS}"),
            Self::NotAMap { row } => write!(f, "row {row} is not a map"),
            Self::NonStringKey { row } => write!(f, "row {row} has a non-string key"),
            Self::DuplicateColumn(c) => write!(f, "duplicate column {c:?}"),
            Self::KeyMismatch { row } => write!(f, "row {row} has a different key set"),
            Self::NestedValue { row, column } => {
                write!(f, "row {row} column {column:?} is not a primitive")
            }
        }
    }
}

/// Проверяет, можно ли закодировать массив таблицей, и строит её.
///
/// Порядок колонок — порядок ключей первой строки. Строки с тем же набором
/// ключей в другом порядке допускаются: их значения переставляются в порядок
/// колонок.
pub fn analyze(items: &[Value]) -> Result<Table<'_>, Rejection> {
    if items.len() < MIN_TABLE_ROWS {
        return Err(Rejection::TooFewRows(items.len()));
    }

    let first = match &items[0] {
        Value::Map(entries) => entries,
        _ => return Err(Rejection::NotAMap { row: 0 }),
    };

    let mut columns: Vec<&str> = Vec::with_capacity(first.len());
    for (key, _) in first {
        let name = key.as_str().ok_or(Rejection::NonStringKey { row: 0 })?;
        if columns.contains(&name) {
            return Err(Rejection::DuplicateColumn(name.to_owned()));
        }
        columns.push(name);
    }

    let mut cells: Vec<&Value> = Vec::with_capacity(items.len() * columns.len());
    for (row, item) in items.iter().enumerate() {
        let entries = match item {
            Value::Map(entries) => entries,
            _ => return Err(Rejection::NotAMap { row }),
        };
        if entries.iter().any(|(k, _)| k.as_str().is_none()) {
            return Err(Rejection::NonStringKey { row });
        }
        // Колонки уникальны, поэтому равная длина и наличие каждой колонки
        // означают совпадение наборов ключей.
        if entries.len() != columns.len() {
            return Err(Rejection::KeyMismatch { row });
        }

        for (pos, column) in columns.iter().enumerate() {
            let value = lookup(entries, pos, column).ok_or(Rejection::KeyMismatch { row })?;
            if !value.is_primitive() {
                return Err(Rejection::NestedValue {
                    row,
                    column: (*column).to_owned(),
                });
            }
            cells.push(value);
        }
    }

    Ok(Table {
        columns,
        cells,
        rows: items.len(),
    })
}

/// Версия [`analyze`] для кодировщика: причина отказа только логируется.
pub fn detect_table(items: &[Value]) -> Option<Table<'_>> {
    match analyze(items) {
        Ok(table) => Some(table),
        Err(reason) => {
            trace!(rows = items.len(), %reason, "array is not tabular");
            None
        }
    }
}

/// Ищет значение колонки в строке. Сначала проверяется та же позиция: обычно
/// строки перечисляют ключи в одном порядке.
fn lookup<'a>(
    entries: &'a [(Value, Value)],
    pos: usize,
    column: &str,
) -> Option<&'a Value> {
    if let Some((k, v)) = entries.get(pos) {
        if k.as_str() == Some(column) {
            return Some(v);
        }
    }
    entries
        .iter()
        .find(|(k, _)| k.as_str() == Some(column))
        .map(|(_, v)| v)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, Value)]) -> Value {
        Value::map(pairs.iter().cloned())
    }

    #[test]
    fn test_uniform_rows_become_table() {
        let items = vec![
            row(&[("id", 1.into()), ("name", "A".into())]),
            row(&[("id", 2.into()), ("name", "B".into())]),
        ];
        let table = analyze(&items).unwrap();
        assert_eq!(table.columns(), ["id", "name"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 2);
        let cells: Vec<Value> = table.cells().iter().map(|v| (*v).clone()).collect();
        assert_eq!(
            cells,
            vec![Value::from(1), "A".into(), Value::from(2), "B".into()]
        );
    }

    #[test]
    fn test_single_row_is_rejected() {
        let items = vec![row(&[("id", 1.into())])];
        assert_eq!(analyze(&items), Err(Rejection::TooFewRows(1)));
        assert_eq!(analyze(&[]), Err(Rejection::TooFewRows(0)));
    }

    #[test]
    fn test_mismatched_keys_are_rejected() {
        let items = vec![
            row(&[("id", 1.into()), ("name", "A".into())]),
            row(&[("id", 2.into()), ("tag", "B".into())]),
        ];
        assert_eq!(analyze(&items), Err(Rejection::KeyMismatch { row: 1 }));
    }

    #[test]
    fn test_extra_or_missing_key_is_rejected() {
        let items = vec![
            row(&[("id", 1.into())]),
            row(&[("id", 2.into()), ("name", "B".into())]),
        ];
        assert_eq!(analyze(&items), Err(Rejection::KeyMismatch { row: 1 }));

        let items = vec![
            row(&[("id", 1.into()), ("name", "A".into())]),
            row(&[("id", 2.into())]),
        ];
        assert_eq!(analyze(&items), Err(Rejection::KeyMismatch { row: 1 }));
    }

    #[test]
    fn test_nested_value_is_rejected() {
        let items = vec![
            row(&[("id", 1.into()), ("tags", Value::from("x"))]),
            row(&[("id", 2.into()), ("tags", Value::array(["a", "b"]))]),
        ];
        assert_eq!(
            analyze(&items),
            Err(Rejection::NestedValue {
                row: 1,
                column: "tags".into()
            })
        );
    }

    #[test]
    fn test_non_map_element_is_rejected() {
        let items = vec![row(&[("id", 1.into())]), Value::from(2)];
        assert_eq!(analyze(&items), Err(Rejection::NotAMap { row: 1 }));

        let items = vec![Value::Null, row(&[("id", 1.into())])];
        assert_eq!(analyze(&items), Err(Rejection::NotAMap { row: 0 }));
    }

    #[test]
    fn test_non_string_key_is_rejected() {
        let items = vec![
            Value::Map(vec![(Value::Int(1), Value::Null)]),
            Value::Map(vec![(Value::Int(1), Value::Null)]),
        ];
        assert_eq!(analyze(&items), Err(Rejection::NonStringKey { row: 0 }));

        let items = vec![
            row(&[("a", 1.into())]),
            Value::Map(vec![(Value::Bool(true), 1.into())]),
        ];
        assert_eq!(analyze(&items), Err(Rejection::NonStringKey { row: 1 }));
    }

    /// Тест проверяет, что массив пустых map становится таблицей без колонок.
    #[test]
    fn test_empty_maps_become_zero_column_table() {
        let items = vec![Value::Map(vec![]), Value::Map(vec![])];
        let table = analyze(&items).unwrap();
        assert_eq!(table.column_count(), 0);
        assert_eq!(table.row_count(), 2);
        assert!(table.cells().is_empty());

        let items = vec![Value::Map(vec![]), row(&[("a", 1.into())])];
        assert_eq!(analyze(&items), Err(Rejection::KeyMismatch { row: 1 }));
    }

    #[test]
    fn test_duplicate_schema_is_rejected() {
        let items = vec![
            row(&[("a", 1.into()), ("a", 2.into())]),
            row(&[("a", 3.into()), ("a", 4.into())]),
        ];
        assert_eq!(
            analyze(&items),
            Err(Rejection::DuplicateColumn("a".into()))
        );
    }

    /// Тест проверяет, что строка с другим порядком ключей переставляется в
    /// порядок колонок первой строки.
    #[test]
    fn test_reordered_row_follows_column_order() {
        let items = vec![
            row(&[("id", 1.into()), ("name", "A".into())]),
            row(&[("name", "B".into()), ("id", 2.into())]),
        ];
        let table = analyze(&items).unwrap();
        let cells: Vec<Value> = table.cells().iter().map(|v| (*v).clone()).collect();
        assert_eq!(
            cells,
            vec![
                Value::from(1),
                Value::from("A"),
                Value::from(2),
                Value::from("B"),
            ]
        );
    }

    /// Тест проверяет, что ячейки одной колонки могут иметь разные типы.
    #[test]
    fn test_mixed_column_types_are_allowed() {
        let items = vec![
            row(&[("v", 1.into())]),
            row(&[("v", "one".into())]),
            row(&[("v", Value::Null)]),
            row(&[("v", Value::Binary(vec![1]))]),
        ];
        let table = analyze(&items).unwrap();
        assert_eq!(table.row_count(), 4);
        assert!(detect_table(&items).is_some());
    }

    #[test]
    fn test_rejection_display() {
        assert_eq!(
            Rejection::TooFewRows(1).to_string(),
            "1 rows, need at least 2"
        );
        assert_eq!(
            Rejection::NestedValue {
                row: 3,
                column: "x".into()
            }
            .to_string(),
            "row 3 column \"x\" is not a primitive"
        );
    }
}
