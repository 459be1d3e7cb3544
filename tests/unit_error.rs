use std::path::PathBuf;

use tk::codec::ParseError;
use tk::error::{exit_codes, Error};

#[test]
fn exit_codes_map_correctly() {
    let user = Error::InvalidArgument("bad".to_string());
    assert_eq!(user.exit_code(), exit_codes::USER_ERROR);

    let date = Error::InvalidDate("whenever".to_string());
    assert_eq!(date.exit_code(), exit_codes::USER_ERROR);

    let missing = Error::TaskNotFound("42".to_string());
    assert_eq!(missing.exit_code(), exit_codes::USER_ERROR);

    let lock = Error::LockFailed(PathBuf::from(".tk/tasks.json.lock"));
    assert_eq!(lock.exit_code(), exit_codes::OPERATION_FAILED);

    let corrupt = Error::CorruptStore("bad schema".to_string());
    assert_eq!(corrupt.exit_code(), exit_codes::OPERATION_FAILED);
}

#[test]
fn parse_error_carries_location() {
    let err = Error::Parse {
        path: PathBuf::from("pending.data"),
        line: 7,
        source: ParseError::NotARecord,
    };
    assert_eq!(err.exit_code(), exit_codes::OPERATION_FAILED);
    let message = err.to_string();
    assert!(message.contains("pending.data"));
    assert!(message.contains("line 7"));
}
