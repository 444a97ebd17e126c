#[cfg(test)]
mod tests {
    use crate::error::HardwareError;
    use crate::flow::{DeviceDraft, FlowPhase, IssuanceFlow};
    use crate::inventory::{GateDraft, LocationInventory};
    use crate::locations::list_locations;
    use crate::test_support::{device, Call, FakeAuthority};
    use gatehouse_common::{DeviceType, DeviceUpdate, GateRequirements, GateType, GateUpdate};
    use gatehouse_config::{Role, Session};
    use std::sync::Arc;

    fn refetch(location: &str) -> [Call; 2] {
        [
            Call::ListDevices(location.to_string()),
            Call::ListGates(location.to_string()),
        ]
    }

    fn inventory() -> (Arc<FakeAuthority>, LocationInventory<FakeAuthority>) {
        let authority = Arc::new(FakeAuthority::new().with_devices(vec![
            device("dev-1", "GATE-AB12", "Entrada Principal"),
            device("dev-2", "DOOR-CD34", "Puerta Alberca"),
        ]));
        let inventory = LocationInventory::new(authority.clone(), "loc-1");
        (authority, inventory)
    }

    #[tokio::test]
    async fn test_refresh_loads_devices_and_gates() {
        let (authority, mut inventory) = inventory();
        assert!(inventory.devices().is_empty());

        inventory.refresh().await.unwrap();

        assert_eq!(inventory.devices().len(), 2);
        assert!(inventory.gates().is_empty());
        assert_eq!(authority.calls(), refetch("loc-1").to_vec());
        assert_eq!(inventory.find_device("gate-ab12").unwrap().id, "dev-1");
        assert_eq!(inventory.find_device("dev-2").unwrap().device_code, "DOOR-CD34");
        assert!(inventory.find_device("dev-9").is_none());
    }

    #[tokio::test]
    async fn test_every_mutation_refetches() {
        let (authority, mut inventory) = inventory();

        inventory.set_device_active("dev-1", false).await.unwrap();
        assert!(!inventory.find_device("dev-1").unwrap().is_active);

        inventory
            .update_device(
                "dev-2",
                &DeviceUpdate {
                    device_name: Some("Puerta Gimnasio".to_string()),
                    ..DeviceUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(inventory.find_device("dev-2").unwrap().device_name, "Puerta Gimnasio");

        inventory.delete_device("dev-1").await.unwrap();
        assert!(inventory.find_device("dev-1").is_none());

        let calls = authority.calls();
        assert_eq!(calls.len(), 9);
        for chunk in calls.chunks(3) {
            assert_eq!(&chunk[1..], &refetch("loc-1"));
        }
        assert_eq!(calls[0], Call::UpdateDevice("dev-1".into(), DeviceUpdate::active(false)));
        assert_eq!(calls[6], Call::DeleteDevice("dev-1".into()));
    }

    #[tokio::test]
    async fn test_issue_refetches_and_keeps_credential_in_flow() {
        let (authority, mut inventory) = inventory();
        let flow = IssuanceFlow::new(authority.clone(), "loc-1");
        let draft = DeviceDraft::new("Salida Vehicular", DeviceType::Gate).with_code("GATE-ZZ99");

        let receipt = inventory.issue_device(&flow, &draft).await.unwrap();

        let calls = authority.calls();
        assert_eq!(calls.len(), 3);
        assert!(matches!(&calls[0], Call::CreateDevice(request) if request.device_code == "GATE-ZZ99"));
        assert_eq!(&calls[1..], &refetch("loc-1"));
        assert_eq!(inventory.find_device("GATE-ZZ99").unwrap().id, receipt.device_id);
        assert_eq!(flow.phase(), FlowPhase::Issued);
        assert_eq!(flow.reveal(|c| c.secret().expose().to_string()).as_deref(), Some("secret-1"));
    }

    #[tokio::test]
    async fn test_regenerate_refetches() {
        let (authority, mut inventory) = inventory();
        inventory.refresh().await.unwrap();
        let flow = IssuanceFlow::new(authority.clone(), "loc-1");

        let receipt = inventory.regenerate_secret(&flow, "DOOR-CD34").await.unwrap();

        assert_eq!(receipt.device_id, "dev-2");
        let calls = authority.calls();
        assert_eq!(calls.len(), 5);
        assert_eq!(calls[2], Call::RegenerateSecret("dev-2".into()));
        assert_eq!(&calls[3..], &refetch("loc-1"));
        assert_eq!(flow.phase(), FlowPhase::Issued);
    }

    #[tokio::test]
    async fn test_regenerate_unknown_device_sends_nothing() {
        let (authority, mut inventory) = inventory();
        let flow = IssuanceFlow::new(authority.clone(), "loc-1");

        let err = inventory.regenerate_secret(&flow, "dev-9").await.unwrap_err();

        assert!(matches!(err, HardwareError::Validation(_)));
        assert!(authority.calls().is_empty());
        assert_eq!(flow.phase(), FlowPhase::Idle);
    }

    #[tokio::test]
    async fn test_failed_refetch_after_issue_keeps_secret() {
        let (authority, mut inventory) = inventory();
        let flow = IssuanceFlow::new(authority.clone(), "loc-1");
        authority.fail_next_listing(HardwareError::Transport("connection reset".into()));

        let draft = DeviceDraft::new("Torniquete", DeviceType::Turnstile).with_code("TURN-0001");
        inventory.issue_device(&flow, &draft).await.unwrap();

        assert_eq!(flow.phase(), FlowPhase::Issued);
        assert!(flow.reveal(|c| c.device_code().to_string()).is_some());
        assert!(inventory.devices().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_issue_skips_refetch() {
        let (authority, mut inventory) = inventory();
        let flow = IssuanceFlow::new(authority.clone(), "loc-1");
        authority.fail_next(HardwareError::Rejected {
            message: "Device code already exists".to_string(),
        });

        let draft = DeviceDraft::new("Entrada", DeviceType::Gate).with_code("GATE-AB12");
        assert!(inventory.issue_device(&flow, &draft).await.is_err());

        assert_eq!(authority.calls().len(), 1);
        assert_eq!(flow.phase(), FlowPhase::Idle);
    }

    #[tokio::test]
    async fn test_gate_lifecycle() {
        let (authority, mut inventory) = inventory();
        let mut draft = GateDraft::new("  Caseta Norte ", GateType::Vehicle);
        draft.is_checkpoint = true;
        draft.requirements = GateRequirements {
            requires_vehicle_photo: true,
            notify_resident: true,
            ..GateRequirements::default()
        };

        let gate = inventory.create_gate(&draft).await.unwrap();
        assert_eq!(gate.name, "Caseta Norte");
        assert_eq!(inventory.gates().len(), 1);
        let calls = authority.calls();
        let Call::CreateGate(request) = &calls[0] else {
            panic!("expected gate creation");
        };
        assert_eq!(request.location_id, "loc-1");
        assert!(request.requirements.requires_vehicle_photo);
        assert!(!request.requirements.auto_approve);

        inventory.set_gate_active(&gate.id, false).await.unwrap();
        assert!(!inventory.find_gate(&gate.id).unwrap().is_active);

        inventory
            .update_gate(
                &gate.id,
                &GateUpdate {
                    name: Some("Caseta Sur".to_string()),
                    ..GateUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(inventory.find_gate(&gate.id).unwrap().name, "Caseta Sur");

        inventory.delete_gate(&gate.id).await.unwrap();
        assert!(inventory.gates().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_edits_send_nothing() {
        let (authority, mut inventory) = inventory();

        let blank_gate = GateDraft::new("   ", GateType::Main);
        assert!(matches!(
            inventory.create_gate(&blank_gate).await,
            Err(HardwareError::Validation(_))
        ));
        assert!(inventory
            .update_device("dev-1", &DeviceUpdate::default())
            .await
            .is_err());
        assert!(inventory
            .update_device(
                "dev-1",
                &DeviceUpdate {
                    relay_number: Some(0),
                    ..DeviceUpdate::default()
                }
            )
            .await
            .is_err());
        assert!(inventory
            .update_gate(
                "gate-1",
                &GateUpdate {
                    name: Some(" ".to_string()),
                    ..GateUpdate::default()
                }
            )
            .await
            .is_err());

        assert!(authority.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failed_mutation_skips_refetch() {
        let (authority, mut inventory) = inventory();
        authority.fail_next(HardwareError::Rejected {
            message: "Device not found".to_string(),
        });

        let err = inventory.delete_device("dev-9").await.unwrap_err();

        assert_eq!(err.operator_message(), "Device not found");
        assert_eq!(authority.calls(), vec![Call::DeleteDevice("dev-9".into())]);
    }

    #[tokio::test]
    async fn test_locations_are_super_admin_only() {
        let authority = FakeAuthority::new();
        let admin = Session::new("tok", Role::Admin, Some("loc-1".to_string()));
        let root = Session::new("tok", Role::SuperAdmin, None);

        assert!(list_locations(&authority, &admin).await.is_err());
        assert!(authority.calls().is_empty());

        let locations = list_locations(&authority, &root).await.unwrap();
        assert_eq!(locations[0].id, "loc-1");
        assert_eq!(authority.calls(), vec![Call::ListLocations]);
    }
}
