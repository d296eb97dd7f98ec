/// Single-page UI: one button that POSTs `/analyze` and renders the table.
pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>syslens</title>
    <style>
        body { font-family: system-ui, sans-serif; margin: 2rem auto; max-width: 960px; color: #222; }
        button { padding: 0.5rem 1.25rem; font-size: 1rem; cursor: pointer; }
        button:disabled { cursor: wait; opacity: 0.6; }
        table { border-collapse: collapse; width: 100%; margin-top: 1.5rem; }
        th, td { border: 1px solid #ccc; padding: 0.5rem; text-align: left; vertical-align: top; }
        th { background: #f4f4f4; }
        td.sev { font-weight: 600; white-space: nowrap; }
        .Critical { color: #b00020; }
        .Warning { color: #b36b00; }
        .Informational { color: #1a5fb4; }
        .Unknown { color: #666; }
        #status { margin-top: 1rem; }
        #status.error { color: #b00020; }
    </style>
</head>
<body>
    <h1>System log analysis</h1>
    <p>Sends the most recent log lines for analysis and lists the issues found.</p>
    <button id="analyze">Analyze logs</button>
    <div id="status"></div>
    <table id="results" hidden>
        <thead>
            <tr><th>Issue</th><th>Severity</th><th>Analysis</th></tr>
        </thead>
        <tbody></tbody>
    </table>
    <script>
        const button = document.getElementById("analyze");
        const status = document.getElementById("status");
        const table = document.getElementById("results");
        const body = table.querySelector("tbody");

        function cell(text, className) {
            const td = document.createElement("td");
            td.textContent = text;
            if (className) td.className = className;
            return td;
        }

        button.addEventListener("click", async () => {
            button.disabled = true;
            status.className = "";
            status.textContent = "Analyzing...";
            table.hidden = true;
            body.replaceChildren();
            try {
                const response = await fetch("/analyze", { method: "POST" });
                const data = await response.json();
                if (!response.ok || !Array.isArray(data)) {
                    throw new Error((data && data.error) || response.statusText);
                }
                for (const issue of data) {
                    const row = document.createElement("tr");
                    row.append(
                        cell(issue["Issue Name"]),
                        cell(issue["Severity"], "sev " + issue["Severity"]),
                        cell(issue["Analysis"]),
                    );
                    body.append(row);
                }
                status.textContent = data.length === 0
                    ? "No issues could be extracted from the analysis."
                    : data.length + " issue(s) found.";
                table.hidden = data.length === 0;
            } catch (err) {
                status.className = "error";
                status.textContent = "Error: " + err.message;
            } finally {
                button.disabled = false;
            }
        });
    </script>
</body>
</html>
"#;
