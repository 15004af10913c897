//! SOAP envelope construction for the `ProcessOperations` call.
//!
//! This is the only place that knows how credentials travel: the service
//! expects them in cleartext inside the request body rather than in headers.

use quick_xml::escape::escape;

use crate::Source;

/// Namespace of the SOAP 1.1 envelope.
pub const SOAP_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
/// Namespace of the asset-management connector web service.
pub const CONNECTOR_NS: &str = "http://www.confirm.co.uk/schema/am/connector/webservice";
/// Value of the `SOAPAction` header for every request.
pub const SOAP_ACTION: &str =
    "http://www.confirm.co.uk/schema/am/connector/webservice/ProcessOperations";
/// Value of the `Content-Type` header for every request.
pub const CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// Wrap serialised operations in an authenticated request envelope.
///
/// Each fragment is placed in its own `<Operation>` element, in order. The
/// fragments are inserted verbatim and must already be well-formed XML;
/// credentials are escaped.
///
/// # Examples
/// ```
/// use assetgrid_core::{Source, build_envelope};
///
/// let source = Source::new("https://confirm.example", "svc", "p&ss", "LIVE");
/// let body = build_envelope(&source, &["<Ping/>".to_owned()]);
/// assert!(body.contains("<Password>p&amp;ss</Password>"));
/// assert!(body.contains("<Operation><Ping/></Operation>"));
/// ```
#[must_use]
pub fn build_envelope(source: &Source, operations: &[String]) -> String {
    let operations = operations
        .iter()
        .map(|operation| format!("<Operation>{operation}</Operation>"))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        r#"<?xml version='1.0' encoding='utf-8'?>
<soap-env:Envelope xmlns:soap-env="{SOAP_ENVELOPE_NS}" xmlns:web="{CONNECTOR_NS}">
    <soap-env:Body>
        <web:ProcessOperationsRequest>
            <Request>
                <Authentication>
                    <Username>{user}</Username>
                    <Password>{password}</Password>
                    <DatabaseId>{tenant}</DatabaseId>
                </Authentication>
                {operations}
            </Request>
        </web:ProcessOperationsRequest>
    </soap-env:Body>
</soap-env:Envelope>
"#,
        user = escape(source.user.as_str()),
        password = escape(source.password.as_str()),
        tenant = escape(source.tenant.as_str()),
    )
}
