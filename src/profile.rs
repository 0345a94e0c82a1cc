/* Static catalog of supported SteelSeries wireless headsets.
 *
 * Each entry describes one hardware variant's battery-query wire protocol:
 * the fixed request payload, the response layout, and the raw-value
 * convention its firmware uses. The table is consumed by one generic
 * query/decode path; there are no per-model code branches. The byte
 * sequences are firmware-exact and not renegotiable. */

pub const STEELSERIES_VID: u16 = 0x1038;

/* Numeric convention a headset family uses for the raw battery byte. */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryRange {
    /* 0x00..=0x04, quarter steps */
    Fractional,
    /* 0x64..=0xa5, offset percentage */
    Offset100,
    /* 0x00..=0x64, plain percentage */
    Direct,
}

/* Battery-query wire protocol for one known headset model. */
#[derive(Debug, Clone, Copy)]
pub struct HeadsetProfile {
    pub name: &'static str,
    pub product_id: u16,
    /* Request payload written verbatim to the HID endpoint. */
    pub request: &'static [u8],
    /* Number of response bytes the firmware answers with. */
    pub response_len: usize,
    /* Offset of the raw battery byte within the response. */
    pub battery_idx: usize,
    pub range: BatteryRange,
    /* Some transmitters answer on behalf of an undocked headset; this is
     * the offset of a flag byte that is zero when nothing is attached.
     * None means the device is considered attached once it responds. */
    pub connected_idx: Option<usize>,
}

/* Table order is the tie-break priority: when several known product ids are
 * present on the bus at once, the first listed entry wins. */
pub static HEADSET_PROFILES: &[HeadsetProfile] = &[
    HeadsetProfile {
        name: "Arctis Pro Wireless",
        product_id: 0x1290,
        request: &[0x40, 0xaa],
        response_len: 2,
        battery_idx: 0,
        range: BatteryRange::Fractional,
        connected_idx: None,
    },
    HeadsetProfile {
        name: "Arctis 7 2017",
        product_id: 0x1260,
        request: &[0x06, 0x18],
        response_len: 8,
        battery_idx: 2,
        range: BatteryRange::Fractional,
        connected_idx: None,
    },
    HeadsetProfile {
        name: "Arctis 7 2019",
        product_id: 0x12ad,
        request: &[0x06, 0x18],
        response_len: 8,
        battery_idx: 2,
        range: BatteryRange::Fractional,
        connected_idx: None,
    },
    HeadsetProfile {
        name: "Arctis Pro 2019",
        product_id: 0x1252,
        request: &[0x06, 0x18],
        response_len: 8,
        battery_idx: 2,
        range: BatteryRange::Fractional,
        connected_idx: None,
    },
    HeadsetProfile {
        name: "Arctis Pro GameDAC",
        product_id: 0x1280,
        request: &[0x06, 0x18],
        response_len: 8,
        battery_idx: 2,
        range: BatteryRange::Fractional,
        connected_idx: None,
    },
    HeadsetProfile {
        name: "Arctis 9",
        product_id: 0x12c2,
        request: &[0x00, 0x20],
        response_len: 12,
        battery_idx: 3,
        range: BatteryRange::Offset100,
        connected_idx: Some(4),
    },
    HeadsetProfile {
        name: "Arctis 1 Wireless",
        product_id: 0x12b3,
        request: &[0x06, 0x12],
        response_len: 8,
        battery_idx: 3,
        range: BatteryRange::Fractional,
        connected_idx: Some(4),
    },
    HeadsetProfile {
        name: "Arctis 7X",
        product_id: 0x12d7,
        request: &[0x06, 0x12],
        response_len: 8,
        battery_idx: 3,
        range: BatteryRange::Fractional,
        connected_idx: Some(4),
    },
    HeadsetProfile {
        name: "Arctis 7 Plus",
        product_id: 0x220e,
        request: &[0x00, 0xb0],
        response_len: 8,
        battery_idx: 2,
        range: BatteryRange::Fractional,
        connected_idx: Some(3),
    },
    HeadsetProfile {
        name: "Arctis Nova 7",
        product_id: 0x2202,
        request: &[0x00, 0xb0],
        response_len: 8,
        battery_idx: 2,
        range: BatteryRange::Fractional,
        connected_idx: Some(3),
    },
    HeadsetProfile {
        name: "Arctis Nova 7X",
        product_id: 0x2206,
        request: &[0x00, 0xb0],
        response_len: 8,
        battery_idx: 2,
        range: BatteryRange::Fractional,
        connected_idx: Some(3),
    },
    HeadsetProfile {
        name: "Arctis Nova 7P",
        product_id: 0x220a,
        request: &[0x00, 0xb0],
        response_len: 8,
        battery_idx: 2,
        range: BatteryRange::Fractional,
        connected_idx: Some(3),
    },
    HeadsetProfile {
        name: "Arctis Nova 5",
        product_id: 0x2232,
        request: &[0x00, 0xb0],
        response_len: 64,
        battery_idx: 3,
        range: BatteryRange::Direct,
        connected_idx: Some(4),
    },
];

/* Return the first table entry whose product id is among the candidates
 * observed on the bus, or None when nothing matches. Pure lookup, no I/O. */
pub fn find_profile(candidates: &[u16]) -> Option<&'static HeadsetProfile> {
    HEADSET_PROFILES
        .iter()
        .find(|profile| candidates.contains(&profile.product_id))
}
