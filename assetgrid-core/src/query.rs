//! Single-box asset searches.
//!
//! [`ConfirmSearch`] serialises an `AssetSearch` operation for one bounding
//! box, sends it through a [`Transport`], decodes the reply generically and
//! turns each returned asset into a [`Feature`].

use log::debug;
use quick_xml::escape::escape;
use thiserror::Error;

use crate::{
    BRITISH_NATIONAL_GRID, BoundingBox, CONNECTOR_NS, DecodeError, Feature, Geometry,
    GeometryError, Mapping, SOAP_ENVELOPE_NS, Source, Transport, TransportError,
    UNKNOWN_FEATURE_ID, Value, decode_document,
};

/// Number of records after which the service silently truncates a search.
pub const RESULT_CAP: usize = 100;

/// Asset attribute holding the well-known-text geometry.
pub const WKT_KEY: &str = "WKT";
/// Asset attribute used as the feature identifier.
pub const ID_KEY: &str = "CentralAssetId";

/// Errors raised while searching one box.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QueryError {
    /// The request could not be delivered.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The response was not well-formed XML.
    #[error("failed to decode search response: {0}")]
    Decode(#[from] DecodeError),
    /// An asset carried unparseable geometry.
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Runs a spatial search for one bounding box.
///
/// The tiler only depends on this trait, so tests can substitute canned
/// result counts for a live service.
pub trait AssetSearch {
    /// Return every asset the service reports inside `bbox`.
    ///
    /// At most [`RESULT_CAP`] features come back; a full page is the only
    /// hint that more exist.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] when the call fails or the reply is malformed.
    fn query_box(
        &self,
        source: &Source,
        bbox: BoundingBox,
        feature_types: &[String],
    ) -> Result<Vec<Feature>, QueryError>;
}

impl<S: AssetSearch + ?Sized> AssetSearch for &S {
    fn query_box(
        &self,
        source: &Source,
        bbox: BoundingBox,
        feature_types: &[String],
    ) -> Result<Vec<Feature>, QueryError> {
        (**self).query_box(source, bbox, feature_types)
    }
}

/// [`AssetSearch`] backed by the asset-management web service.
#[derive(Debug, Clone)]
pub struct ConfirmSearch<T> {
    transport: T,
}

impl<T: Transport> ConfirmSearch<T> {
    /// Search through `transport`.
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Borrow the underlying transport.
    pub const fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: Transport> AssetSearch for ConfirmSearch<T> {
    fn query_box(
        &self,
        source: &Source,
        bbox: BoundingBox,
        feature_types: &[String],
    ) -> Result<Vec<Feature>, QueryError> {
        let operation = asset_search_operation(bbox, feature_types);
        let body = self.transport.send(source, &[operation])?;
        let response = decode_document(body)?;
        let features = features_from_response(&response)?;
        debug!("box {bbox} returned {} feature(s)", features.len());
        Ok(features)
    }
}

/// Serialise an `AssetSearch` operation for `bbox`.
///
/// # Examples
/// ```
/// use assetgrid_core::{BoundingBox, asset_search_operation};
///
/// let op = asset_search_operation(BoundingBox::new(1, 2, 3, 4), &["LAMP".to_owned()]);
/// assert!(op.starts_with("<AssetSearch><SearchBoundX1>1</SearchBoundX1>"));
/// assert!(op.ends_with("<FeatureGroupCode>LAMP</FeatureGroupCode></AssetSearch>"));
/// ```
#[must_use]
pub fn asset_search_operation(bbox: BoundingBox, feature_types: &[String]) -> String {
    let mut operation = format!(
        "<AssetSearch>\
         <SearchBoundX1>{}</SearchBoundX1>\
         <SearchBoundY1>{}</SearchBoundY1>\
         <SearchBoundX2>{}</SearchBoundX2>\
         <SearchBoundY2>{}</SearchBoundY2>",
        bbox.west, bbox.south, bbox.east, bbox.north
    );
    for code in feature_types {
        operation.push_str(&format!(
            "<FeatureGroupCode>{}</FeatureGroupCode>",
            escape(code.as_str())
        ));
    }
    operation.push_str("</AssetSearch>");
    operation
}

/// Extract features from a decoded `ProcessOperations` response.
///
/// A response without the expected structure holds no features.
///
/// # Errors
///
/// Returns [`GeometryError`] when an asset's `WKT` attribute cannot be
/// parsed.
pub fn features_from_response(response: &Mapping) -> Result<Vec<Feature>, GeometryError> {
    let envelope = format!("{{{SOAP_ENVELOPE_NS}}}Envelope");
    let body = format!("{{{SOAP_ENVELOPE_NS}}}Body");
    let result = format!("{{{CONNECTOR_NS}}}ProcessOperationsResult");
    let search = response.get(&envelope).and_then(|value| {
        value.path(&[
            body.as_str(),
            result.as_str(),
            "Response",
            "OperationResponse",
            "AssetSearchResponse",
        ])
    });

    let entries: &[Mapping] = match search {
        Some(Value::List(entries)) => entries,
        Some(Value::Map(single)) => std::slice::from_ref(single),
        _ => &[],
    };
    entries
        .iter()
        .filter_map(|entry| match entry.get("Asset")? {
            Value::Map(asset) => Some(feature_from_attributes(asset)),
            Value::List(parts) => Some(feature_from_attributes(parts.iter().flatten())),
            Value::Null | Value::Text(_) => None,
        })
        .collect()
}

fn feature_from_attributes<'a>(
    attributes: impl IntoIterator<Item = (&'a str, &'a Value)>,
) -> Result<Feature, GeometryError> {
    let mut geometry = None;
    let mut properties = Mapping::new();
    for (key, value) in attributes {
        match (key, value) {
            (WKT_KEY, Value::Text(wkt)) => {
                geometry = Some(Geometry::from_wkt(wkt, BRITISH_NATIONAL_GRID)?);
            }
            (WKT_KEY, Value::Null) => {}
            _ => {
                properties.insert(key, value.clone());
            }
        }
    }
    let id = properties
        .get(ID_KEY)
        .and_then(Value::as_text)
        .unwrap_or(UNKNOWN_FEATURE_ID)
        .to_owned();
    Ok(Feature {
        id,
        geometry,
        properties,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubTransport;
    use rstest::{fixture, rstest};

    fn response(search_body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="{SOAP_ENVELOPE_NS}">
  <soap:Body>
    <web:ProcessOperationsResult xmlns:web="{CONNECTOR_NS}">
      <Response>
        <OperationResponse>
          <AssetSearchResponse>{search_body}</AssetSearchResponse>
        </OperationResponse>
      </Response>
    </web:ProcessOperationsResult>
  </soap:Body>
</soap:Envelope>"#
        )
    }

    fn asset(id: &str, wkt: Option<&str>) -> String {
        let geometry = wkt.map(|w| format!("<WKT>{w}</WKT>")).unwrap_or_default();
        format!(
            "<Asset><CentralAssetId>{id}</CentralAssetId>\
             <FeatureTypeName>Lamp</FeatureTypeName>{geometry}</Asset>"
        )
    }

    fn decoded(search_body: &str) -> Mapping {
        decode_document(response(search_body).as_bytes()).expect("fixture is well-formed")
    }

    #[fixture]
    fn source() -> Source {
        Source::new("https://confirm.example/soap", "svc", "pw", "LIVE")
    }

    #[rstest]
    fn many_assets_keep_response_order() {
        let body = [
            asset("3", Some("POINT (1 2)")),
            asset("1", Some("POINT (3 4)")),
            asset("2", None),
        ]
        .concat();
        let features = features_from_response(&decoded(&body)).expect("valid geometry");

        let ids: Vec<_> = features.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "1", "2"]);
    }

    #[rstest]
    fn wkt_becomes_geometry_and_leaves_properties() {
        let features = features_from_response(&decoded(&asset("9", Some("POINT (5 6)"))))
            .expect("valid geometry");
        let [feature] = features.as_slice() else {
            panic!("expected exactly one feature, got {features:?}");
        };
        let geometry = feature.geometry.as_ref().expect("geometry parsed");
        assert_eq!(geometry.srid, BRITISH_NATIONAL_GRID);
        assert!(!feature.properties.contains_key(WKT_KEY));
        assert_eq!(
            feature.properties.get("FeatureTypeName").and_then(Value::as_text),
            Some("Lamp")
        );
    }

    #[rstest]
    fn asset_without_wkt_keeps_properties() {
        let features =
            features_from_response(&decoded(&asset("4", None))).expect("nothing to parse");
        let [feature] = features.as_slice() else {
            panic!("expected exactly one feature, got {features:?}");
        };
        assert!(feature.geometry.is_none());
        assert_eq!(feature.id, "4");
        assert_eq!(feature.properties.len(), 2);
    }

    #[rstest]
    #[case::empty_search("")]
    #[case::text_only("nothing here")]
    fn empty_search_yields_nothing(#[case] body: &str) {
        let features = features_from_response(&decoded(body)).expect("no geometry");
        assert!(features.is_empty());
    }

    #[rstest]
    fn missing_path_yields_nothing() {
        let unrelated = decode_document("<Fault>oops</Fault>".as_bytes()).expect("well-formed");
        assert!(features_from_response(&unrelated).expect("no geometry").is_empty());
    }

    #[rstest]
    fn placeholder_entries_are_skipped() {
        let body = format!("<Asset>stub</Asset>{}<Other/>", asset("7", None));
        let features = features_from_response(&decoded(&body)).expect("no geometry");
        let ids: Vec<_> = features.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["7"]);
    }

    #[rstest]
    fn empty_asset_is_skipped() {
        let body = format!("<Asset/>{}", asset("8", None));
        let features = features_from_response(&decoded(&body)).expect("no geometry");
        let ids: Vec<_> = features.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["8"]);
    }

    #[rstest]
    fn foreign_srid_is_rejected() {
        let body = asset("5", Some("SRID=4326;POINT (0 51)"));
        let err = features_from_response(&decoded(&body))
            .expect_err("coordinates are not British National Grid");
        assert!(err.message.contains("4326"));
    }

    #[rstest]
    fn asset_with_attributes_is_still_read() {
        let body = r#"<Asset status="live"><FeatureId>1</FeatureId><WKT>POINT (0 0)</WKT></Asset>"#;
        let features = features_from_response(&decoded(body)).expect("valid geometry");
        let [feature] = features.as_slice() else {
            panic!("expected exactly one feature, got {features:?}");
        };
        assert!(feature.geometry.is_some());
        assert_eq!(
            feature.properties.get("FeatureId").and_then(Value::as_text),
            Some("1")
        );
    }

    #[rstest]
    fn invalid_wkt_is_an_error() {
        let err = features_from_response(&decoded(&asset("1", Some("POINT (x y)"))))
            .expect_err("geometry is invalid");
        assert_eq!(err.wkt, "POINT (x y)");
    }

    #[rstest]
    fn query_box_sends_one_search_operation(source: Source) {
        let transport = StubTransport::new();
        transport.push_response(response(&asset("1", Some("POINT (1 1)"))));
        let search = ConfirmSearch::new(&transport);

        let features = search
            .query_box(
                &source,
                BoundingBox::new(-1, -1, 21, 21),
                &["LAMP".to_owned(), "SIGN".to_owned()],
            )
            .expect("canned response decodes");

        assert_eq!(features.len(), 1);
        let requests = transport.requests();
        let [operations] = requests.as_slice() else {
            panic!("expected one request, got {requests:?}");
        };
        assert_eq!(
            operations.as_slice(),
            [asset_search_operation(
                BoundingBox::new(-1, -1, 21, 21),
                &["LAMP".to_owned(), "SIGN".to_owned()],
            )]
        );
        assert!(operations[0].contains("<SearchBoundX1>-1</SearchBoundX1>"));
        assert!(operations[0].contains("<SearchBoundY2>21</SearchBoundY2>"));
    }

    #[rstest]
    fn transport_failure_propagates(source: Source) {
        let transport = StubTransport::new();
        transport.push_error(TransportError::Network {
            url: source.url.clone(),
            message: "connection refused".to_owned(),
        });
        let err = ConfirmSearch::new(transport)
            .query_box(&source, BoundingBox::new(0, 0, 1, 1), &[])
            .expect_err("transport failed");
        assert!(matches!(err, QueryError::Transport(_)));
    }

    #[rstest]
    fn malformed_response_is_a_decode_error(source: Source) {
        let transport = StubTransport::new();
        transport.push_response("<soap:Envelope>");
        let err = ConfirmSearch::new(transport)
            .query_box(&source, BoundingBox::new(0, 0, 1, 1), &[])
            .expect_err("response is malformed");
        assert!(matches!(err, QueryError::Decode(_)));
    }

    #[rstest]
    fn feature_codes_are_escaped() {
        let op = asset_search_operation(BoundingBox::new(0, 0, 1, 1), &["A&B".to_owned()]);
        assert!(op.contains("<FeatureGroupCode>A&amp;B</FeatureGroupCode>"));
    }
}
