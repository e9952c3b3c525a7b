pub mod decode;
pub mod encode;

// Публичный экспорт всех типов ошибок из вложенных модулей, чтобы упростить
// доступ к ним из внешнего кода.
pub use decode::*;
pub use encode::*;
