use assert_matches::assert_matches;
use packageurl::{PackageUrl, Qualifiers, ValidationError};
use simple_test_case::test_case;

fn build(package_type: &str, namespace: Option<&str>, name: &str, version: Option<&str>) -> PackageUrl {
    PackageUrl::builder()
        .package_type(package_type)
        .maybe_namespace(namespace)
        .name(name)
        .maybe_version(version)
        .build()
}

#[test_case("npm", None, "LODASH", "pkg:npm/lodash"; "npm_name")]
#[test_case("npm", Some("@Angular"), "Core", "pkg:npm/%40angular/core"; "npm_namespace")]
#[test_case("pypi", None, "My_Pkg", "pkg:pypi/my-pkg"; "pypi")]
#[test_case("rpm", Some("Fedora"), "NAME", "pkg:rpm/fedora/NAME"; "rpm_keeps_name")]
#[test_case("qpkg", Some("QNAP"), "Foo", "pkg:qpkg/qnap/Foo"; "qpkg_keeps_name")]
#[test_case("github", Some("Package-URL"), "Purl-Spec", "pkg:github/package-url/purl-spec"; "github")]
#[test_case("bitbucket", Some("Birkenfeld"), "Pygments-Main", "pkg:bitbucket/birkenfeld/pygments-main"; "bitbucket")]
#[test_case("golang", Some("GitHub.com/Gorilla"), "Context", "pkg:golang/github.com/gorilla/context"; "golang")]
#[test_case("composer", Some("Laravel"), "Laravel", "pkg:composer/laravel/laravel"; "composer")]
#[test_case("apk", Some("Alpine"), "Curl", "pkg:apk/alpine/curl"; "apk")]
#[test_case("alpm", Some("Arch"), "Pacman", "pkg:alpm/arch/pacman"; "alpm")]
#[test_case("maven", Some("Org.Apache"), "Commons-IO", "pkg:maven/Org.Apache/Commons-IO"; "maven_keeps_case")]
#[test_case("cargo", None, "Serde_JSON", "pkg:cargo/Serde_JSON"; "cargo_keeps_case")]
#[test_case("Unknown", Some("Some/NS"), "Some_Name", "pkg:unknown/Some/NS/Some_Name"; "unknown_type_keeps_case")]
#[test]
fn type_sensitivity(package_type: &str, namespace: Option<&str>, name: &str, expected: &str) {
    let purl = build(package_type, namespace, name, None).normalize().expect("must normalize");
    pretty_assertions::assert_eq!(purl.to_string(), expected);
}

#[test]
fn huggingface_version_is_lowercased() {
    let purl = build("huggingface", Some("microsoft"), "deberta-v3-base", Some("559062AD13D311B87B2C455E67DCD5F1C8F65111"))
        .normalize()
        .expect("must normalize");
    pretty_assertions::assert_eq!(purl.version(), Some("559062ad13d311b87b2c455e67dcd5f1c8f65111"));
}

#[test_case("https://adb-5245952564735461.0.azuredatabricks.net/api/2.0/mlflow", "creditfraud"; "databricks")]
#[test_case("https://westus2.api.azureml.ms/mlflow/v1.0", "CreditFraud"; "azureml")]
#[test]
fn mlflow_depends_on_repository(repository_url: &str, expected: &str) {
    let purl = PackageUrl::builder()
        .package_type("mlflow")
        .name("CreditFraud")
        .version("3")
        .qualifiers(Qualifiers::from_pairs([("repository_url", repository_url)]).expect("valid qualifiers"))
        .build()
        .normalize()
        .expect("must normalize");
    pretty_assertions::assert_eq!(purl.name(), expected);
}

#[test]
fn normalize_is_idempotent() {
    let purl = PackageUrl::builder()
        .package_type("Deb")
        .namespace("/Debian/")
        .name("Curl")
        .version("7.50.3-1")
        .qualifiers(Qualifiers::from_pairs([("Distro", "Jessie"), ("arch", "i386"), ("empty", "")]).expect("valid qualifiers"))
        .subpath("//usr//share/")
        .build();

    let once = purl.normalize().expect("must normalize");
    pretty_assertions::assert_eq!(once.to_string(), "pkg:deb/debian/curl@7.50.3-1?arch=i386&distro=jessie#usr/share");

    let twice = once.clone().normalize().expect("must normalize");
    pretty_assertions::assert_eq!(twice, once);
}

#[test]
fn absent_components_stay_absent() {
    let purl = PackageUrl::builder()
        .package_type("generic")
        .namespace("/")
        .name("openssl")
        .version("")
        .subpath("")
        .build()
        .normalize()
        .expect("must normalize");
    pretty_assertions::assert_eq!(purl.namespace(), None);
    pretty_assertions::assert_eq!(purl.version(), None);
    pretty_assertions::assert_eq!(purl.subpath(), None);
}

#[test]
fn missing_name() {
    let err = build("generic", None, "", None).normalize().expect_err("must fail");
    pretty_assertions::assert_eq!(err, ValidationError::MissingName);
}

#[test_case(""; "empty")]
#[test_case("n pm"; "space")]
#[test_case("npm/x"; "slash")]
#[test_case("ñpm"; "non_ascii")]
#[test]
fn invalid_type(package_type: &str) {
    let err = build(package_type, None, "lodash", None).normalize().expect_err("must fail");
    assert_matches!(err, ValidationError::InvalidType { .. });
}

#[test_case("swift", None, Some("5.4.3"); "swift_no_namespace")]
#[test_case("swift", Some("github.com/Alamofire"), None; "swift_no_version")]
#[test_case("cran", None, None; "cran_no_version")]
#[test_case("cran", None, Some(""); "cran_empty_version")]
#[test_case("conan", Some("bincrafters"), Some("1.1.1"); "conan_no_channel")]
#[test]
fn structure(package_type: &str, namespace: Option<&str>, version: Option<&str>) {
    let err = build(package_type, namespace, "pkg", version).normalize().expect_err("must fail");
    assert_matches!(err, ValidationError::InvalidStructure { package_type: ty, .. } if ty == package_type);
}

#[test]
fn conan_empty_channel_is_seen_before_being_dropped() {
    let result = PackageUrl::builder()
        .package_type("conan")
        .namespace("bincrafters")
        .name("openssl")
        .version("1.1.1")
        .qualifiers(Qualifiers::from_pairs([("channel", "")]).expect("valid qualifiers"))
        .build()
        .normalize();
    assert_matches!(result, Err(ValidationError::InvalidStructure { .. }));

    let purl = PackageUrl::builder()
        .package_type("conan")
        .namespace("bincrafters")
        .name("openssl")
        .version("1.1.1")
        .qualifiers(Qualifiers::from_pairs([("channel", "stable")]).expect("valid qualifiers"))
        .build()
        .normalize()
        .expect("must normalize");
    pretty_assertions::assert_eq!(purl.to_string(), "pkg:conan/bincrafters/openssl@1.1.1?channel=stable");
}

#[test]
fn cran_with_version() {
    let purl = build("cran", None, "caret", Some("6.0-88")).normalize().expect("must normalize");
    pretty_assertions::assert_eq!(purl.to_string(), "pkg:cran/caret@6.0-88");
}

#[test]
fn subpath_traversal() {
    let err = PackageUrl::builder()
        .package_type("generic")
        .name("openssl")
        .subpath("sub/../path")
        .build()
        .normalize()
        .expect_err("must fail");
    pretty_assertions::assert_eq!(
        err,
        ValidationError::InvalidSubpathSegment {
            subpath: "sub/../path".to_string(),
            segment: "..".to_string(),
        }
    );

    let purl = PackageUrl::builder()
        .package_type("generic")
        .name("openssl")
        .subpath("./sub/path")
        .build()
        .normalize()
        .expect("must normalize");
    pretty_assertions::assert_eq!(purl.subpath(), Some("./sub/path"));
}
