use derived_context_extraction as dcx;
use dcx::eager::EagerContexts;
use dcx::lazy::LazyContexts;
use dcx::Navigate;
use pretty_assertions::assert_eq;
use serde_json::json;

const DERIVED_CONTEXTS: &str = include_str!("fixtures/derived_contexts.json");
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/92.0.4515.107 Safari/537.36";

#[test]
fn eager_yauaa_agent_class() {
    let key = "contexts_nl_basjes_yauaa_context_1";
    let out = dcx::get_derived_context_map(key, DERIVED_CONTEXTS).unwrap();
    assert_eq!(out.object(key).unwrap()["agentClass"], json!("Browser"));
}

#[test]
fn lazy_yauaa_agent_class() {
    let key = "contexts_nl_basjes_yauaa_context_1";
    let out = dcx::get_derived_context_map2(key, DERIVED_CONTEXTS).unwrap();
    assert_eq!(out.family(key).get("agentClass").string(), "Browser");
}

#[test]
fn lazy_dbip_isp_traits() {
    let key = "contexts_com_dbip_isp_1";
    let out = dcx::get_derived_context_map2(key, DERIVED_CONTEXTS).unwrap();
    let traits = out.family(key).get("traits");
    assert_eq!(traits.get("connection_type").string(), "Corporate");
    assert_eq!(traits.get("autonomous_system_number").float64(), 20001.0);
}

#[test]
fn lazy_http_headers_by_position() {
    let key = "contexts_org_ietf_http_header_1";
    let out = dcx::get_derived_context_map2(key, DERIVED_CONTEXTS).unwrap();
    let headers = out.family(key);
    assert_eq!(headers.at(0).get("name").string(), "Host");
    assert_eq!(headers.at(0).get("value").string(), "sp.ted.com");
    assert_eq!(headers.at(3).get("value").string(), USER_AGENT);
}

#[test]
fn http_header_order_matches_source_for_both_accessors() {
    let key = "contexts_org_ietf_http_header_1";
    let expected = ["Host", "Origin", "Referer", "User-Agent", "X-Forwarded-For"];

    let lazy = LazyContexts::all(DERIVED_CONTEXTS).unwrap();
    let names: Vec<String> = lazy.family(key).iter().map(|h| h.get("name").string()).collect();
    assert_eq!(names, expected);

    let eager = EagerContexts::decode_all(DERIVED_CONTEXTS).unwrap();
    let names: Vec<String> = eager.family(key).iter().map(|h| h.get("name").string()).collect();
    assert_eq!(names, expected);
}

#[test]
fn every_family_of_the_event() {
    let lazy = LazyContexts::all(DERIVED_CONTEXTS).unwrap();
    let families: Vec<(&str, usize)> = lazy.keys().map(|k| (k, lazy.family(k).len())).collect();
    assert_eq!(
        families,
        vec![
            ("contexts_com_dbip_isp_1", 1),
            ("contexts_com_dbip_location_1", 1),
            ("contexts_com_snowplowanalytics_snowplow_ua_parser_context_1", 1),
            ("contexts_nl_basjes_yauaa_context_1", 1),
            ("contexts_org_ietf_http_header_1", 5),
        ]
    );
    assert!(lazy.diagnostics().is_empty());
}

#[test]
fn non_ascii_names_and_nested_arrays() {
    let key = "contexts_com_dbip_location_1";
    let out = dcx::get_derived_context_map2(key, DERIVED_CONTEXTS).unwrap();
    let loc = out.family(key);
    assert_eq!(loc.get("city").get("names").get("ja").string(), "デル・マー");
    let path: dcx::Path = "$.subdivisions[1].names.en".parse().unwrap();
    assert_eq!(loc.path(&path).string(), "San Diego");
    assert_eq!(loc.get("location").get("longitude").float64(), -117.265);
    assert!(!loc.get("country").get("is_in_european_union").boolean());
    assert!(loc.get("country").get("is_in_european_union").exists());
}

#[test]
fn null_leaf_in_ua_parser() {
    let key = "contexts_com_snowplowanalytics_snowplow_ua_parser_context_1";
    let out = dcx::get_derived_context_map2(key, DERIVED_CONTEXTS).unwrap();
    let patch_minor = out.family(key).get("osPatchMinor");
    assert!(patch_minor.is_null());
    assert_eq!(patch_minor.string(), "");
}

#[test]
fn eager_and_lazy_agree_on_every_leaf_of_the_event() {
    let eager = EagerContexts::decode_all(DERIVED_CONTEXTS).unwrap();
    let lazy = LazyContexts::all(DERIVED_CONTEXTS).unwrap();
    assert_eq!(eager.keys().collect::<Vec<_>>(), lazy.keys().collect::<Vec<_>>());

    let mut leaves = 0;
    for key in eager.keys() {
        let (ef, lf) = (eager.family(key), lazy.family(key));
        assert_eq!(ef.len(), lf.len());
        for (i, decoded) in ef.iter().enumerate() {
            let mut paths = Vec::new();
            collect_leaves(decoded.value().unwrap(), dcx::Path::default(), &mut paths);
            for (path, leaf) in paths {
                let l = lf.at(i).path(&path);
                assert_eq!(l.decode().unwrap().unwrap(), *leaf, "{key}[{i}] {path}");
                assert_eq!(l.string(), decoded.path(&path).string());
                assert_eq!(l.float64(), decoded.path(&path).float64());
                leaves += 1;
            }
        }
    }
    assert!(leaves > 100);
}

fn collect_leaves<'v>(
    v: &'v serde_json::Value,
    at: dcx::Path,
    out: &mut Vec<(dcx::Path, &'v serde_json::Value)>,
) {
    match v {
        serde_json::Value::Object(m) => {
            for (k, child) in m {
                collect_leaves(child, at.clone().key(k.as_str()), out);
            }
        }
        serde_json::Value::Array(a) => {
            for (i, child) in a.iter().enumerate() {
                collect_leaves(child, at.clone().index(i), out);
            }
        }
        _ => out.push((at, v)),
    }
}
