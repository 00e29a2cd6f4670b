//! UPnP device description served at `/description.xml`.

use std::net::IpAddr;

/// Render the bridge's UPnP device description.
///
/// Deterministic for a given input. Line endings are CRLF, which some SSDP
/// clients require.
pub fn description_xml(ip: IpAddr, port: u16, serial_number: &str, uuid: &str) -> String {
    let lines = [
        "<?xml version='1.0' encoding='UTF-8' ?>".to_string(),
        "<root xmlns='urn:schemas-upnp-org:device-1-0'>".to_string(),
        "<specVersion>".to_string(),
        "<major>1</major>".to_string(),
        "<minor>0</minor>".to_string(),
        "</specVersion>".to_string(),
        format!("<URLBase>http://{ip}:{port}/</URLBase>"),
        "<device>".to_string(),
        "<deviceType>urn:schemas-upnp-org:device:Basic:1</deviceType>".to_string(),
        format!("<friendlyName>Philips hue ({ip})</friendlyName>"),
        "<manufacturer>Royal Philips Electronics</manufacturer>".to_string(),
        "<manufacturerURL>http://www.philips.com</manufacturerURL>".to_string(),
        "<modelDescription>Philips hue Personal Wireless Lighting</modelDescription>".to_string(),
        "<modelName>Philips hue bridge 2015</modelName>".to_string(),
        "<modelNumber>BSB002</modelNumber>".to_string(),
        "<modelURL>http://www.meethue.com</modelURL>".to_string(),
        format!("<serialNumber>{serial_number}</serialNumber>"),
        format!("<UDN>uuid:{uuid}</UDN>"),
        "<presentationURL>index.html</presentationURL>".to_string(),
        "<iconList>".to_string(),
        "<icon>".to_string(),
        "<mimetype>image/png</mimetype>".to_string(),
        "<height>48</height>".to_string(),
        "<width>48</width>".to_string(),
        "<depth>24</depth>".to_string(),
        "<url>hue_logo_0.png</url>".to_string(),
        "</icon>".to_string(),
        "</iconList>".to_string(),
        "</device>".to_string(),
        "</root>".to_string(),
    ];

    let mut xml = lines.join("\r\n");
    xml.push_str("\r\n");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn sample() -> String {
        description_xml(
            IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20)),
            8080,
            "0017887ebe7d",
            "2f402f80-da50-11e1-9b23-0017887ebe7d",
        )
    }

    #[test]
    fn test_url_base_and_identity_fields() {
        let xml = sample();
        assert!(xml.contains("<URLBase>http://192.168.1.20:8080/</URLBase>"));
        assert!(xml.contains("<friendlyName>Philips hue (192.168.1.20)</friendlyName>"));
        assert!(xml.contains("<serialNumber>0017887ebe7d</serialNumber>"));
        assert!(xml.contains("<UDN>uuid:2f402f80-da50-11e1-9b23-0017887ebe7d</UDN>"));
        assert!(xml.contains("<modelNumber>BSB002</modelNumber>"));
    }

    #[test]
    fn test_every_line_ends_with_crlf() {
        let xml = sample();
        assert!(xml.ends_with("</root>\r\n"));
        assert_eq!(xml.matches('\n').count(), xml.matches("\r\n").count());
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(sample(), sample());
    }
}
