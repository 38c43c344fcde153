//! Method and event names used on the wire.

/// Well-known handle of the service manager.
pub const SERVICE_MANAGER_HANDLE: &str = "service_manager";

// Service manager
pub const GET_SERVICE: &str = "getService";
pub const GET_TRANSPORT: &str = "getTransport";
pub const REGISTER_FOR_NOTIFICATIONS: &str = "registerForNotifications";

// Any handle
pub const LINK_TO_DEATH: &str = "linkToDeath";

// Supplicant root
pub const ADD_INTERFACE: &str = "addInterface";
pub const REMOVE_INTERFACE: &str = "removeInterface";
pub const LIST_INTERFACES: &str = "listInterfaces";
pub const GET_INTERFACE: &str = "getInterface";
pub const SET_DEBUG_PARAMS: &str = "setDebugParams";
pub const TERMINATE: &str = "terminate";

// Vendor supplicant root
pub const GET_VENDOR_INTERFACE: &str = "getVendorInterface";

// Station interface
pub const REGISTER_CALLBACK: &str = "registerCallback";
pub const REGISTER_VENDOR_CALLBACK: &str = "registerVendorCallback";
pub const ADD_NETWORK: &str = "addNetwork";
pub const REMOVE_NETWORK: &str = "removeNetwork";
pub const LIST_NETWORKS: &str = "listNetworks";
pub const GET_NETWORK: &str = "getNetwork";
pub const REASSOCIATE: &str = "reassociate";
pub const RECONNECT: &str = "reconnect";
pub const DISCONNECT: &str = "disconnect";
pub const GET_KEY_MGMT_CAPABILITIES: &str = "getKeyMgmtCapabilities";
pub const START_WPS_PBC: &str = "startWpsPbc";
pub const START_WPS_PIN_DISPLAY: &str = "startWpsPinDisplay";
pub const CANCEL_WPS: &str = "cancelWps";
pub const ADD_DPP_PEER_URI: &str = "addDppPeerUri";
pub const REMOVE_DPP_URI: &str = "removeDppUri";
pub const START_DPP_CONFIGURATOR_INITIATOR: &str = "startDppConfiguratorInitiator";
pub const START_DPP_ENROLLEE_INITIATOR: &str = "startDppEnrolleeInitiator";
pub const STOP_DPP_INITIATOR: &str = "stopDppInitiator";

// Station network
pub const SET_SSID: &str = "setSsid";
pub const SET_KEY_MGMT: &str = "setKeyMgmt";
pub const SET_PSK_PASSPHRASE: &str = "setPskPassphrase";
pub const SET_WEP_KEY: &str = "setWepKey";
pub const SET_WEP_TX_KEY_IDX: &str = "setWepTxKeyIdx";
pub const SET_SCAN_SSID: &str = "setScanSsid";
pub const SET_BSSID: &str = "setBssid";
pub const SET_REQUIRE_PMF: &str = "setRequirePmf";
pub const ENABLE: &str = "enable";
pub const SELECT: &str = "select";

// Hostapd root
pub const ADD_ACCESS_POINT: &str = "addAccessPoint";
pub const REMOVE_ACCESS_POINT: &str = "removeAccessPoint";

// Events
pub const ON_REGISTRATION: &str = "onRegistration";
pub const ON_SERVICE_DIED: &str = "onServiceDied";
pub const ON_NETWORK_ADDED: &str = "onNetworkAdded";
pub const ON_NETWORK_REMOVED: &str = "onNetworkRemoved";
pub const ON_STATE_CHANGED: &str = "onStateChanged";
pub const ON_VENDOR_STATE_CHANGED: &str = "onVendorStateChanged";
pub const ON_DISCONNECTED: &str = "onDisconnected";
pub const ON_ASSOCIATION_REJECTED: &str = "onAssociationRejected";
pub const ON_AUTHENTICATION_TIMEOUT: &str = "onAuthenticationTimeout";
pub const ON_BSSID_CHANGED: &str = "onBssidChanged";
pub const ON_EAP_FAILURE: &str = "onEapFailure";
pub const ON_EAP_FAILURE_1_1: &str = "onEapFailure_1_1";
pub const ON_WPS_EVENT_SUCCESS: &str = "onWpsEventSuccess";
pub const ON_WPS_EVENT_FAIL: &str = "onWpsEventFail";
pub const ON_WPS_EVENT_PBC_OVERLAP: &str = "onWpsEventPbcOverlap";
pub const ON_ANQP_QUERY_DONE: &str = "onAnqpQueryDone";
pub const ON_DPP_SUCCESS_CONFIG_RECEIVED: &str = "onDppSuccessConfigReceived";
pub const ON_DPP_SUCCESS_CONFIG_SENT: &str = "onDppSuccessConfigSent";
pub const ON_DPP_PROGRESS: &str = "onDppProgress";
pub const ON_DPP_FAILURE: &str = "onDppFailure";
pub const ON_DPP_AUTH_SUCCESS: &str = "onDppAuthSuccess";
pub const ON_AP_FAILURE: &str = "onFailure";
