//! Unit tests for the Identifiers module
//!
//! Tests cover creation, parsing, conversion, and display formatting
//! of every identifier type.

use core_kernel::{TripId, MemberId, ExpenseId, ActivityId};
use uuid::Uuid;

mod member_id_tests {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        let id1 = MemberId::new();
        let id2 = MemberId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_new_v7_generates_time_ordered_ids() {
        let id1 = MemberId::new_v7();
        std::thread::sleep(std::time::Duration::from_millis(1));
        let id2 = MemberId::new_v7();
        let uuid1: Uuid = id1.into();
        let uuid2: Uuid = id2.into();
        assert!(uuid1 < uuid2);
    }

    #[test]
    fn test_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = MemberId::from_uuid(uuid);
        assert_eq!(*id.as_uuid(), uuid);
    }

    #[test]
    fn test_from_str_with_prefix() {
        let original = MemberId::new();
        let parsed: MemberId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_from_str_without_prefix() {
        let uuid = Uuid::new_v4();
        let parsed: MemberId = uuid.to_string().parse().unwrap();
        assert_eq!(*parsed.as_uuid(), uuid);
    }

    #[test]
    fn test_from_str_rejects_garbage() {
        assert!("MBR-xyz".parse::<MemberId>().is_err());
    }
}

mod prefixes {
    use super::*;

    #[test]
    fn test_each_identifier_has_its_own_prefix() {
        assert_eq!(TripId::prefix(), "TRP");
        assert_eq!(MemberId::prefix(), "MBR");
        assert_eq!(ExpenseId::prefix(), "EXP");
        assert_eq!(ActivityId::prefix(), "ACT");
    }

    #[test]
    fn test_display_uses_prefix() {
        assert!(TripId::new().to_string().starts_with("TRP-"));
        assert!(ExpenseId::new().to_string().starts_with("EXP-"));
        assert!(ActivityId::new().to_string().starts_with("ACT-"));
    }
}

mod serialization {
    use super::*;

    #[test]
    fn test_serializes_as_bare_uuid() {
        let uuid = Uuid::new_v4();
        let id = TripId::from_uuid(uuid);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", uuid));
    }

    #[test]
    fn test_deserializes_from_bare_uuid() {
        let uuid = Uuid::new_v4();
        let id: ExpenseId = serde_json::from_str(&format!("\"{}\"", uuid)).unwrap();
        assert_eq!(*id.as_uuid(), uuid);
    }
}
