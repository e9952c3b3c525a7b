use std::{any::Any, error::Error};

use crate::StatusCode;

/// Расширение для ошибок кодека (object-safe).
///
/// Предоставляет вспомогательные методы для вызывающего слоя:
/// - извлечение статус-кода,
/// - безопасное сообщение для клиента,
/// - детализированное сообщение для логов.
pub trait ErrorExt: Error + Send + Sync + 'static {
    /// Статус ошибки для вызывающего слоя (HTTP-обработчик, CLI и т.п.).
    ///
    /// По умолчанию возвращает [`StatusCode::Internal`].
    fn status_code(&self) -> StatusCode {
        StatusCode::Internal
    }

    /// Возвращает ошибку как [`Any`](std::any::Any),
    /// чтобы можно было выполнить downcast к конкретному типу.
    fn as_any(&self) -> &dyn Any;

    /// Безопасное сообщение для клиента.
    ///
    /// Для внутренних ошибок возвращает строку `"Internal codec error"`,
    /// чтобы не раскрывать детали реализации.
    fn client_message(&self) -> String {
        match self.status_code() {
            StatusCode::Unknown | StatusCode::Internal => "Internal codec error".to_string(),
            _ => self.to_string(),
        }
    }

    /// Детализированное сообщение для логов.
    fn log_message(&self) -> String {
        format!("{self:?}")
    }

    /// Имя типа ошибки (для логирования).
    fn type_name(&self) -> String {
        std::any::type_name::<Self>()
            .split("::")
            .last()
            .unwrap_or("Unknown")
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::{any::Any, error::Error, fmt};

    use super::*;

    // Вспомогательный тип ошибки без переопределения status_code (использует
    // default = Internal).
    #[derive(Debug)]
    struct DefaultError(pub &'static str);

    impl fmt::Display for DefaultError {
        fn fmt(
            &self,
            f: &mut fmt::Formatter<'_>,
        ) -> fmt::Result {
            write!(f, "DefaultError: {}", self.0)
        }
    }

    impl Error for DefaultError {}

    impl ErrorExt for DefaultError {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[derive(Debug)]
    struct BadTagError(pub &'static str);

    impl fmt::Display for BadTagError {
        fn fmt(
            &self,
            f: &mut fmt::Formatter<'_>,
        ) -> fmt::Result {
            write!(f, "BadTag: {}", self.0)
        }
    }

    impl Error for BadTagError {}

    impl ErrorExt for BadTagError {
        fn status_code(&self) -> StatusCode {
            StatusCode::UnknownTag
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    /// Тест проверяет, что по умолчанию статус ошибки — `Internal`.
    #[test]
    fn test_default_status_code_is_internal() {
        let e = DefaultError("oops");
        assert_eq!(e.status_code(), StatusCode::Internal);
    }

    /// Тест проверяет, что для внутренних ошибок `client_message` возвращает
    /// safe-строку.
    #[test]
    fn test_client_message_internal() {
        let e = DefaultError("sensitive");
        assert_eq!(e.client_message(), "Internal codec error".to_string());
    }

    /// Тест проверяет, что для остальных кодов `client_message` возвращает
    /// `Display`.
    #[test]
    fn test_client_message_non_internal() {
        let e = BadTagError("0xc1");
        assert_eq!(e.client_message(), e.to_string());
    }

    #[test]
    fn test_as_any_downcast() {
        let e = BadTagError("x");
        let down = e.as_any().downcast_ref::<BadTagError>();
        assert!(down.is_some(), "as_any должен позволять downcast к исходному типу");
        assert_eq!(down.unwrap().0, "x");
    }

    #[test]
    fn test_log_message_matches_debug() {
        let e = BadTagError("dbg");
        assert_eq!(e.log_message(), format!("{:?}", e));
    }

    /// Тест проверяет, что `type_name` возвращает короткое имя типа (без
    /// модулей).
    #[test]
    fn test_type_name_returns_short_struct_name() {
        let e = BadTagError("n");
        let tn = e.type_name();
        assert!(
            tn.ends_with("BadTagError"),
            "type_name должен оканчиваться на 'BadTagError', got: {tn}"
        );
    }
}
