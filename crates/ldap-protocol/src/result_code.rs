//! LDAP result codes.

use std::fmt;

/// Result code reported by the directory for a completed operation.
///
/// Codes 0-80 are defined by RFC 4511. Codes above 80 are client-side codes
/// conventionally reported by provider libraries when no server response
/// was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ResultCode {
    /// The operation completed successfully.
    Success,
    /// The operation is not properly sequenced.
    OperationsError,
    /// The server received malformed data.
    ProtocolError,
    /// The time limit of a search was exceeded.
    TimeLimitExceeded,
    /// The size limit of a search was exceeded.
    SizeLimitExceeded,
    /// A compare evaluated to false.
    CompareFalse,
    /// A compare evaluated to true.
    CompareTrue,
    /// The requested authentication method is not supported.
    AuthMethodNotSupported,
    /// The server requires strong authentication.
    StrongAuthRequired,
    /// The request must be sent to another server.
    Referral,
    /// An administrative limit was exceeded.
    AdminLimitExceeded,
    /// A critical control is not supported.
    UnavailableCriticalExtension,
    /// Confidentiality is required for this operation.
    ConfidentialityRequired,
    /// A SASL bind needs another round trip.
    SaslBindInProgress,
    /// The attribute does not exist in the entry.
    NoSuchAttribute,
    /// The attribute type is not defined.
    UndefinedAttributeType,
    /// The matching rule is inappropriate for the attribute.
    InappropriateMatching,
    /// A constraint was violated.
    ConstraintViolation,
    /// The attribute or value already exists.
    AttributeOrValueExists,
    /// The attribute value has invalid syntax.
    InvalidAttributeSyntax,
    /// The target entry does not exist.
    NoSuchObject,
    /// An alias problem occurred.
    AliasProblem,
    /// The DN has invalid syntax.
    InvalidDnSyntax,
    /// An alias could not be dereferenced.
    AliasDereferencingProblem,
    /// The authentication method is inappropriate.
    InappropriateAuthentication,
    /// The supplied credentials are invalid.
    InvalidCredentials,
    /// The client lacks sufficient access rights.
    InsufficientAccessRights,
    /// The server is too busy.
    Busy,
    /// The server is unavailable.
    Unavailable,
    /// The server is unwilling to perform the operation.
    UnwillingToPerform,
    /// A loop was detected.
    LoopDetect,
    /// A naming violation occurred.
    NamingViolation,
    /// An object class violation occurred.
    ObjectClassViolation,
    /// The operation is not allowed on a non-leaf entry.
    NotAllowedOnNonLeaf,
    /// The operation is not allowed on an RDN.
    NotAllowedOnRdn,
    /// The entry already exists.
    EntryAlreadyExists,
    /// Object class modifications are prohibited.
    ObjectClassModsProhibited,
    /// The operation affects multiple DSAs.
    AffectsMultipleDsas,
    /// Any other server-side error.
    Other,
    /// Client-side: the connection to the server was lost.
    ServerDown,
    /// Client-side: a local error occurred.
    LocalError,
    /// Client-side: the operation timed out waiting for the server.
    Timeout,
    /// Client-side: the connection could not be established.
    ConnectError,
}

impl ResultCode {
    /// Numeric value of this result code.
    #[must_use]
    pub fn code(self) -> u32 {
        match self {
            Self::Success => 0,
            Self::OperationsError => 1,
            Self::ProtocolError => 2,
            Self::TimeLimitExceeded => 3,
            Self::SizeLimitExceeded => 4,
            Self::CompareFalse => 5,
            Self::CompareTrue => 6,
            Self::AuthMethodNotSupported => 7,
            Self::StrongAuthRequired => 8,
            Self::Referral => 10,
            Self::AdminLimitExceeded => 11,
            Self::UnavailableCriticalExtension => 12,
            Self::ConfidentialityRequired => 13,
            Self::SaslBindInProgress => 14,
            Self::NoSuchAttribute => 16,
            Self::UndefinedAttributeType => 17,
            Self::InappropriateMatching => 18,
            Self::ConstraintViolation => 19,
            Self::AttributeOrValueExists => 20,
            Self::InvalidAttributeSyntax => 21,
            Self::NoSuchObject => 32,
            Self::AliasProblem => 33,
            Self::InvalidDnSyntax => 34,
            Self::AliasDereferencingProblem => 36,
            Self::InappropriateAuthentication => 48,
            Self::InvalidCredentials => 49,
            Self::InsufficientAccessRights => 50,
            Self::Busy => 51,
            Self::Unavailable => 52,
            Self::UnwillingToPerform => 53,
            Self::LoopDetect => 54,
            Self::NamingViolation => 64,
            Self::ObjectClassViolation => 65,
            Self::NotAllowedOnNonLeaf => 66,
            Self::NotAllowedOnRdn => 67,
            Self::EntryAlreadyExists => 68,
            Self::ObjectClassModsProhibited => 69,
            Self::AffectsMultipleDsas => 71,
            Self::Other => 80,
            Self::ServerDown => 81,
            Self::LocalError => 82,
            Self::Timeout => 85,
            Self::ConnectError => 91,
        }
    }

    /// Look up a result code by its numeric value.
    #[must_use]
    pub fn from_code(code: u32) -> Option<Self> {
        let rc = match code {
            0 => Self::Success,
            1 => Self::OperationsError,
            2 => Self::ProtocolError,
            3 => Self::TimeLimitExceeded,
            4 => Self::SizeLimitExceeded,
            5 => Self::CompareFalse,
            6 => Self::CompareTrue,
            7 => Self::AuthMethodNotSupported,
            8 => Self::StrongAuthRequired,
            10 => Self::Referral,
            11 => Self::AdminLimitExceeded,
            12 => Self::UnavailableCriticalExtension,
            13 => Self::ConfidentialityRequired,
            14 => Self::SaslBindInProgress,
            16 => Self::NoSuchAttribute,
            17 => Self::UndefinedAttributeType,
            18 => Self::InappropriateMatching,
            19 => Self::ConstraintViolation,
            20 => Self::AttributeOrValueExists,
            21 => Self::InvalidAttributeSyntax,
            32 => Self::NoSuchObject,
            33 => Self::AliasProblem,
            34 => Self::InvalidDnSyntax,
            36 => Self::AliasDereferencingProblem,
            48 => Self::InappropriateAuthentication,
            49 => Self::InvalidCredentials,
            50 => Self::InsufficientAccessRights,
            51 => Self::Busy,
            52 => Self::Unavailable,
            53 => Self::UnwillingToPerform,
            54 => Self::LoopDetect,
            64 => Self::NamingViolation,
            65 => Self::ObjectClassViolation,
            66 => Self::NotAllowedOnNonLeaf,
            67 => Self::NotAllowedOnRdn,
            68 => Self::EntryAlreadyExists,
            69 => Self::ObjectClassModsProhibited,
            71 => Self::AffectsMultipleDsas,
            80 => Self::Other,
            81 => Self::ServerDown,
            82 => Self::LocalError,
            85 => Self::Timeout,
            91 => Self::ConnectError,
            _ => return None,
        };
        Some(rc)
    }

    /// Whether an operation that ended with this code may succeed if it is
    /// reattempted on a fresh connection.
    #[must_use]
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            Self::Busy | Self::Unavailable | Self::ServerDown | Self::Timeout | Self::ConnectError
        )
    }

    /// Whether this code denotes a completed, non-error outcome.
    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success | Self::CompareTrue | Self::CompareFalse)
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.code())
    }
}
