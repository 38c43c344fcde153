mod common;

use common::{BSSID, IFACE, ready_iface};
use serde_json::json;
use wlanhal::{DppAkm, DppConfiguratorRequest, DppNetRole, Error, HalTier, KeyMgmt, MacAddress, NetworkConfig};
use wlanhal_protocol::StatusCode;
use wlanhal_protocol::consts::key_mgmt;
use wlanhal_protocol::method;
use wlanhal_runtime::fake_daemon::FakeDaemonBuilder;

fn home() -> NetworkConfig {
	NetworkConfig::wpa_psk(1, "home", "password1")
}

fn methods(calls: &[wlanhal_runtime::fake_daemon::RecordedCall]) -> Vec<&str> {
	calls.iter().map(|call| call.method.as_str()).collect()
}

#[tokio::test]
async fn connect_pushes_the_config_and_selects() {
	let (hal, fake, _) = ready_iface(FakeDaemonBuilder::new()).await;

	hal.connect_to_network(IFACE, &home()).await.unwrap();

	assert_eq!(fake.network_ids(IFACE), vec![0]);
	let network = fake.network(IFACE, 0).unwrap();
	assert!(network.selected);
	assert_eq!(network.fields["setSsid"], json!({"ssid": b"home".to_vec()}));
	assert_eq!(network.fields["setKeyMgmt"]["mask"], key_mgmt::WPA_PSK);
	assert_eq!(network.fields["setPskPassphrase"]["passphrase"], "password1");
	assert!(network.fields.contains_key("setRequirePmf"));
	assert!(!network.fields.contains_key("setBssid"));

	assert_eq!(hal.current_network_id(IFACE).await.unwrap(), Some(1));
	assert_eq!(hal.current_network(IFACE).await.unwrap(), Some(home()));
}

#[tokio::test]
async fn reconnecting_to_the_same_network_only_updates_the_bssid() {
	let (hal, fake, _) = ready_iface(FakeDaemonBuilder::new()).await;
	hal.connect_to_network(IFACE, &home()).await.unwrap();
	fake.take_calls();

	hal.connect_to_network(IFACE, &home().with_bssid(BSSID)).await.unwrap();
	assert_eq!(methods(&fake.take_calls()), vec![method::SET_BSSID, method::SELECT]);

	hal.connect_to_network(IFACE, &home().with_bssid(BSSID)).await.unwrap();
	assert_eq!(methods(&fake.take_calls()), vec![method::SELECT]);
	assert_eq!(fake.network_ids(IFACE), vec![0]);
	assert_eq!(hal.current_network(IFACE).await.unwrap().unwrap().bssid, Some(BSSID));
}

#[tokio::test]
async fn connecting_elsewhere_replaces_every_daemon_network() {
	let (hal, fake, _) = ready_iface(FakeDaemonBuilder::new()).await;
	fake.add_network(IFACE);
	hal.connect_to_network(IFACE, &home()).await.unwrap();
	assert_eq!(fake.network_ids(IFACE), vec![1]);

	hal.connect_to_network(IFACE, &NetworkConfig::open(2, "cafe")).await.unwrap();
	assert_eq!(fake.network_ids(IFACE), vec![2]);
	assert_eq!(hal.current_network_id(IFACE).await.unwrap(), Some(2));
	assert_eq!(fake.network(IFACE, 2).unwrap().fields["setKeyMgmt"]["mask"], key_mgmt::NONE);
}

#[tokio::test]
async fn failed_config_push_leaves_no_network_behind() {
	let (hal, fake, _) = ready_iface(FakeDaemonBuilder::new()).await;
	fake.fail_once(method::SET_PSK_PASSPHRASE, StatusCode::FailureArgsInvalid);

	let err = hal.connect_to_network(IFACE, &home()).await.unwrap_err();
	assert!(
		matches!(err, Error::ConfigPushFailed { field: "pskPassphrase", code: StatusCode::FailureArgsInvalid }),
		"{err:?}"
	);
	assert!(fake.network_ids(IFACE).is_empty());
	assert_eq!(hal.current_network_id(IFACE).await.unwrap(), None);
}

#[tokio::test]
async fn failed_select_keeps_the_network_for_a_retry() {
	let (hal, fake, _) = ready_iface(FakeDaemonBuilder::new()).await;
	fake.fail_once(method::SELECT, StatusCode::FailureUnknown);

	let err = hal.connect_to_network(IFACE, &home()).await.unwrap_err();
	assert!(matches!(err, Error::SelectFailed(StatusCode::FailureUnknown)), "{err:?}");
	assert_eq!(hal.current_network_id(IFACE).await.unwrap(), Some(1));

	fake.take_calls();
	hal.connect_to_network(IFACE, &home()).await.unwrap();
	assert_eq!(methods(&fake.take_calls()), vec![method::SELECT]);
}

#[tokio::test]
async fn unsupported_fils_schemes_are_stripped() {
	let (hal, fake, _) = ready_iface(FakeDaemonBuilder::new().key_mgmt_mask(key_mgmt::WPA_PSK | key_mgmt::FILS_SHA256)).await;
	let config = home().with_key_mgmt(KeyMgmt::FilsSha256).with_key_mgmt(KeyMgmt::FilsSha384);

	hal.connect_to_network(IFACE, &config).await.unwrap();

	let mask = &fake.network(IFACE, 0).unwrap().fields["setKeyMgmt"]["mask"];
	assert_eq!(*mask, key_mgmt::WPA_PSK | key_mgmt::FILS_SHA256);
	// The caller's view keeps what it asked for.
	assert_eq!(hal.current_network(IFACE).await.unwrap(), Some(config));
}

#[tokio::test]
async fn wep_and_hidden_networks_push_their_fields() {
	let (hal, fake, _) = ready_iface(FakeDaemonBuilder::new()).await;
	let config = NetworkConfig::wep(3, "legacy", vec![Vec::new(), b"abcde".to_vec()], 1).hidden();

	hal.connect_to_network(IFACE, &config).await.unwrap();

	let network = fake.network(IFACE, 0).unwrap();
	assert_eq!(network.fields["setWepKey"]["index"], 1);
	assert_eq!(network.fields["setWepTxKeyIdx"]["index"], 1);
	assert_eq!(network.fields["setScanSsid"]["enable"], true);
	assert_eq!(fake.count(method::SET_WEP_KEY), 1);
}

#[tokio::test]
async fn roaming_within_the_current_network_reassociates() {
	let (hal, fake, _) = ready_iface(FakeDaemonBuilder::new()).await;
	hal.connect_to_network(IFACE, &home()).await.unwrap();
	fake.take_calls();

	hal.roam_to_network(IFACE, &home().with_bssid(BSSID)).await.unwrap();

	assert_eq!(methods(&fake.take_calls()), vec![method::SET_BSSID, method::REASSOCIATE]);
	assert_eq!(hal.current_network(IFACE).await.unwrap().unwrap().bssid, Some(BSSID));
}

#[tokio::test]
async fn roaming_to_another_network_connects() {
	let (hal, fake, _) = ready_iface(FakeDaemonBuilder::new()).await;
	hal.connect_to_network(IFACE, &home()).await.unwrap();

	let cafe = NetworkConfig::open(2, "cafe");
	hal.roam_to_network(IFACE, &cafe).await.unwrap();

	assert_eq!(fake.network_ids(IFACE), vec![1]);
	assert_eq!(hal.current_network_id(IFACE).await.unwrap(), Some(2));
	assert_eq!(fake.count(method::REASSOCIATE), 0);
}

#[tokio::test]
async fn set_current_network_bssid_requires_a_network() {
	let (hal, fake, _) = ready_iface(FakeDaemonBuilder::new()).await;
	assert!(matches!(hal.set_current_network_bssid(IFACE, BSSID).await, Err(Error::NoCurrentNetwork(_))));

	hal.connect_to_network(IFACE, &home().with_bssid(BSSID)).await.unwrap();
	hal.set_current_network_bssid(IFACE, MacAddress::ANY).await.unwrap();
	assert_eq!(fake.network(IFACE, 0).unwrap().fields["setBssid"]["bssid"], json!([0, 0, 0, 0, 0, 0]));
	assert_eq!(hal.current_network(IFACE).await.unwrap().unwrap().bssid, None);
}

#[tokio::test]
async fn linked_networks_are_added_and_enabled() {
	let (hal, fake, _) = ready_iface(FakeDaemonBuilder::new()).await;
	hal.connect_to_network(IFACE, &home()).await.unwrap();

	let linked = [NetworkConfig::wpa_psk(2, "home-5g", "password1"), NetworkConfig::wpa_psk(3, "home-ext", "password1")];
	hal.update_linked_networks(IFACE, 1, &linked).await.unwrap();

	assert_eq!(fake.network_ids(IFACE), vec![0, 1, 2]);
	assert!(fake.network(IFACE, 1).unwrap().enabled);
	assert!(fake.network(IFACE, 2).unwrap().enabled);
	assert_eq!(hal.linked_network_ids(IFACE).await.unwrap(), vec![2, 3]);

	hal.update_linked_networks(IFACE, 1, &linked[..1]).await.unwrap();
	assert_eq!(fake.network_ids(IFACE), vec![0, 3]);
	assert_eq!(hal.linked_network_ids(IFACE).await.unwrap(), vec![2]);
}

#[tokio::test]
async fn linked_networks_require_the_current_network_id() {
	let (hal, fake, _) = ready_iface(FakeDaemonBuilder::new()).await;
	hal.connect_to_network(IFACE, &home()).await.unwrap();

	let err = hal.update_linked_networks(IFACE, 9, &[NetworkConfig::open(2, "x")]).await.unwrap_err();
	assert!(matches!(err, Error::StaleNetworkId { requested: 9, current: Some(1) }), "{err:?}");
	assert_eq!(fake.network_ids(IFACE), vec![0]);
}

#[tokio::test]
async fn linked_failure_keeps_the_entries_already_added() {
	let (hal, fake, _) = ready_iface(FakeDaemonBuilder::new()).await;
	hal.connect_to_network(IFACE, &home()).await.unwrap();
	fake.fail_after(method::ADD_NETWORK, 1, StatusCode::FailureUnknown);

	let linked = [NetworkConfig::wpa_psk(2, "home-5g", "password1"), NetworkConfig::wpa_psk(3, "home-ext", "password1")];
	let err = hal.update_linked_networks(IFACE, 1, &linked).await.unwrap_err();

	assert!(matches!(err, Error::LinkedNetworkAddFailed { added: 1, code: StatusCode::FailureUnknown }), "{err:?}");
	assert_eq!(hal.linked_network_ids(IFACE).await.unwrap(), vec![2]);
	assert_eq!(fake.network_ids(IFACE), vec![0, 1]);
}

#[tokio::test]
async fn remove_all_networks_clears_the_session() {
	let (hal, fake, _) = ready_iface(FakeDaemonBuilder::new()).await;
	hal.connect_to_network(IFACE, &home()).await.unwrap();

	hal.remove_all_networks(IFACE).await.unwrap();
	assert!(fake.network_ids(IFACE).is_empty());
	assert_eq!(hal.current_network_id(IFACE).await.unwrap(), None);
}

#[tokio::test]
async fn partial_removal_reports_progress_and_keeps_the_session() {
	let (hal, fake, _) = ready_iface(FakeDaemonBuilder::new()).await;
	hal.connect_to_network(IFACE, &home()).await.unwrap();
	hal.update_linked_networks(IFACE, 1, &[NetworkConfig::open(2, "cafe")]).await.unwrap();
	fake.fail_after(method::REMOVE_NETWORK, 1, StatusCode::FailureUnknown);

	let err = hal.remove_all_networks(IFACE).await.unwrap_err();
	assert!(
		matches!(err, Error::PartialRemovalFailed { network_id: 1, removed: 1, code: StatusCode::FailureUnknown }),
		"{err:?}"
	);
	assert_eq!(fake.network_ids(IFACE), vec![1]);
	assert_eq!(hal.current_network_id(IFACE).await.unwrap(), Some(1));
}

#[tokio::test]
async fn remove_network_if_current_checks_the_id() {
	let (hal, fake, _) = ready_iface(FakeDaemonBuilder::new()).await;
	hal.connect_to_network(IFACE, &home()).await.unwrap();

	assert!(!hal.remove_network_if_current(IFACE, 5).await.unwrap());
	assert_eq!(fake.network_ids(IFACE), vec![0]);

	assert!(hal.remove_network_if_current(IFACE, 1).await.unwrap());
	assert!(fake.network_ids(IFACE).is_empty());
	assert_eq!(hal.current_network_id(IFACE).await.unwrap(), None);
}

#[tokio::test]
async fn operations_on_untracked_interfaces_fail() {
	let (hal, _fake, _) = ready_iface(FakeDaemonBuilder::new()).await;

	assert!(matches!(hal.connect_to_network("wlan9", &home()).await, Err(Error::NotTracked(name)) if name == "wlan9"));
	assert!(matches!(hal.reassociate("wlan9").await, Err(Error::NotTracked(_))));
	assert!(matches!(hal.capabilities("wlan9").await, Err(Error::NotTracked(_))));
}

#[tokio::test]
async fn station_controls_reach_the_interface() {
	let (hal, fake, _) = ready_iface(FakeDaemonBuilder::new()).await;

	hal.reassociate(IFACE).await.unwrap();
	hal.reconnect(IFACE).await.unwrap();
	hal.disconnect(IFACE).await.unwrap();

	assert_eq!(fake.count(method::REASSOCIATE), 1);
	assert_eq!(fake.count(method::RECONNECT), 1);
	assert_eq!(fake.count(method::DISCONNECT), 1);
}

#[tokio::test]
async fn wps_operations() {
	let (hal, fake, _) = ready_iface(FakeDaemonBuilder::new()).await;

	hal.start_wps_pbc(IFACE, None).await.unwrap();
	assert_eq!(fake.calls_to(method::START_WPS_PBC)[0].params["bssid"], json!([0, 0, 0, 0, 0, 0]));

	assert_eq!(hal.start_wps_pin_display(IFACE, Some(BSSID)).await.unwrap(), "12345670");
	hal.cancel_wps(IFACE).await.unwrap();
	assert_eq!(fake.count(method::CANCEL_WPS), 1);
}

#[tokio::test]
async fn dpp_requires_the_newest_tier() {
	let (hal, fake, _) = ready_iface(FakeDaemonBuilder::new().supplicant_tier(HalTier::V1_1)).await;

	assert!(matches!(hal.add_dpp_peer_uri(IFACE, "DPP:K:abc;;").await, Err(Error::Unsupported(_))));
	assert_eq!(fake.count(method::ADD_DPP_PEER_URI), 0);
}

#[tokio::test]
async fn dpp_initiators() {
	let (hal, fake, _) = ready_iface(FakeDaemonBuilder::new()).await;

	let peer = hal.add_dpp_peer_uri(IFACE, "DPP:K:abc;;").await.unwrap();
	assert_eq!(peer, 1);
	hal.start_dpp_enrollee_initiator(IFACE, peer, 0).await.unwrap();

	let request = DppConfiguratorRequest {
		peer_bootstrap_id: peer,
		own_bootstrap_id: 0,
		ssid: b"home".to_vec(),
		password: "password1".to_string(),
		psk: String::new(),
		net_role: DppNetRole::Sta,
		akm: DppAkm::Sae,
	};
	hal.start_dpp_configurator_initiator(IFACE, request).await.unwrap();
	let params = &fake.calls_to(method::START_DPP_CONFIGURATOR_INITIATOR)[0].params;
	assert_eq!(params["securityAkm"], wlanhal_protocol::consts::dpp::akm::SAE);
	assert_eq!(params["netRole"], wlanhal_protocol::consts::dpp::net_role::STA);
	assert_eq!(params["peerBootstrapId"], 1);

	hal.stop_dpp_initiator(IFACE).await.unwrap();
	hal.remove_dpp_uri(IFACE, peer).await.unwrap();
	assert_eq!(fake.count(method::STOP_DPP_INITIATOR), 1);
	assert_eq!(fake.count(method::REMOVE_DPP_URI), 1);
}
